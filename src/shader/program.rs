use std::collections::BTreeSet;

use crate::foundation::error::{VesselError, VesselResult};
use crate::shader::base::{BaseProgram, base_program};
use crate::shader::slot::{ShaderDialect, ShaderFragment, ShaderSlot, ShaderStage};

/// A base program plus the fragments capabilities have injected into it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderSet {
    /// Base program name.
    pub program: String,
    /// Injected fragments in registration order.
    pub fragments: Vec<ShaderFragment>,
}

/// Final stage sources for one dialect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssembledProgram {
    /// Dialect of both sources.
    pub dialect: ShaderDialect,
    /// Vertex stage source.
    pub vertex: String,
    /// Fragment stage source.
    pub fragment: String,
}

impl AssembledProgram {
    /// Source of `stage`.
    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

impl ShaderSet {
    /// A set with no injections.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            fragments: Vec::new(),
        }
    }

    /// Append a fragment; fragments sharing a slot keep this order.
    pub fn inject(&mut self, fragment: ShaderFragment) {
        self.fragments.push(fragment);
    }

    /// Fragments bound to `slot`, in registration order.
    pub fn fragments_in(&self, slot: ShaderSlot) -> impl Iterator<Item = &ShaderFragment> {
        self.fragments.iter().filter(move |f| f.slot == slot)
    }

    /// Splice every fragment into the base program for `dialect`.
    ///
    /// Fails when a fragment has no source for `dialect` or when the base program lacks the
    /// marker of a slot that has fragments.
    pub fn assemble(&self, dialect: ShaderDialect) -> VesselResult<AssembledProgram> {
        let base = base_program(&self.program, dialect).ok_or_else(|| {
            VesselError::shader(format!(
                "no base program '{}' for dialect {dialect}",
                self.program
            ))
        })?;

        for fragment in &self.fragments {
            if fragment.source(dialect).is_none() {
                return Err(VesselError::shader(format!(
                    "fragment for '{}' from '{}' has no {dialect} source",
                    fragment.slot, fragment.owner
                )));
            }
        }

        let vertex = self.splice(base, ShaderStage::Vertex, dialect)?;
        let fragment = self.splice(base, ShaderStage::Fragment, dialect)?;
        Ok(AssembledProgram {
            dialect,
            vertex,
            fragment,
        })
    }

    fn splice(
        &self,
        base: BaseProgram,
        stage: ShaderStage,
        dialect: ShaderDialect,
    ) -> VesselResult<String> {
        let source = match stage {
            ShaderStage::Vertex => base.vertex,
            ShaderStage::Fragment => base.fragment,
        };

        let mut seen = BTreeSet::new();
        let mut out = String::with_capacity(source.len() + 256);
        for line in source.lines() {
            out.push_str(line);
            out.push('\n');

            let Some(slot) = marker_slot(line) else {
                continue;
            };
            if !slot.stages().contains(&stage) {
                continue;
            }
            seen.insert(slot);

            let indent = &line[..line.len() - line.trim_start().len()];
            for fragment in self.fragments_in(slot) {
                let text = fragment.source(dialect).unwrap_or_default();
                for body_line in text.lines() {
                    if body_line.is_empty() {
                        out.push('\n');
                        continue;
                    }
                    out.push_str(indent);
                    out.push_str(body_line);
                    out.push('\n');
                }
            }
        }

        for fragment in &self.fragments {
            if fragment.slot.stages().contains(&stage) && !seen.contains(&fragment.slot) {
                return Err(VesselError::shader(format!(
                    "base program '{}' ({dialect}) has no '{}' marker in its {stage:?} stage",
                    base.name, fragment.slot
                )));
            }
        }
        Ok(out)
    }
}

fn marker_slot(line: &str) -> Option<ShaderSlot> {
    let rest = line.trim().strip_prefix("//")?;
    rest.trim().parse().ok()
}

#[cfg(test)]
#[path = "../../tests/unit/shader/program.rs"]
mod tests;
