//! Narrowing of the VM pool by ids, exact name or name pattern.

use crate::core::domain::{
    error::{OneError, OneResult, ValidationError},
    model::vm::VmPoolEntry,
};
use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Which VMs to collect facts for. Resolved once from the raw options.
#[derive(Debug, Clone)]
pub enum VmSelector {
    /// The whole pool.
    All,
    /// Every listed id must exist.
    Ids(Vec<String>),
    /// First VM with exactly this name.
    Name(String),
    /// Every VM whose name matches at its start.
    Pattern { regex: Regex, case_insensitive: bool },
}

impl VmSelector {
    /// Resolves the mutually exclusive `ids` and `name` options.
    ///
    /// An empty id list or empty name counts as not given. A name starting with
    /// `~*` is a case-insensitive pattern, `~` a case-sensitive one, anything
    /// else an exact name.
    ///
    /// # Errors
    ///
    /// * [`OneError::Configuration`] if both options are given
    /// * [`OneError::Validation`] if the pattern is not a valid regex
    pub fn from_params(ids: Option<Vec<String>>, name: Option<String>) -> OneResult<Self> {
        let ids = ids.filter(|ids| !ids.is_empty());
        let name = name.filter(|name| !name.is_empty());

        match (ids, name) {
            (Some(_), Some(_)) => Err(OneError::Configuration(
                "parameters are mutually exclusive: ids|name".to_string(),
            )),
            (Some(ids), None) => Ok(Self::Ids(ids)),
            (None, Some(name)) => Self::from_name(&name),
            (None, None) => Ok(Self::All),
        }
    }

    fn from_name(name: &str) -> OneResult<Self> {
        let Some(pattern) = name.strip_prefix('~') else {
            return Ok(Self::Name(name.to_string()));
        };
        let (pattern, case_insensitive) = match pattern.strip_prefix('*') {
            Some(rest) => (rest, true),
            None => (pattern, false),
        };
        // Anchored at the start only: prefix semantics, not a full match.
        let regex = RegexBuilder::new(&format!("^(?:{})", pattern))
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| ValidationError::Field {
                field: "name".to_string(),
                message: format!("Invalid pattern '{}': {}", pattern, e),
            })?;
        Ok(Self::Pattern {
            regex,
            case_insensitive,
        })
    }

    /// Applies the selector to the pool, keeping pool order.
    ///
    /// # Errors
    ///
    /// Returns [`OneError::NotFound`] when requested ids are missing (all of
    /// them named in one message) or when no VM has the exact name. A pattern
    /// never fails; it may select nothing.
    pub fn select(&self, pool: Vec<VmPoolEntry>) -> OneResult<Vec<VmPoolEntry>> {
        let selected = match self {
            Self::All => pool,
            Self::Ids(ids) => select_by_ids(pool, ids)?,
            Self::Name(name) => {
                let vm = pool.into_iter().find(|vm| &vm.name == name).ok_or_else(|| {
                    OneError::NotFound(format!("There is no VM with name={}", name))
                })?;
                vec![vm]
            }
            Self::Pattern { regex, .. } => pool
                .into_iter()
                .filter(|vm| regex.is_match(&vm.name))
                .collect(),
        };
        debug!(selector = ?self, selected = selected.len(), "selected VMs");
        Ok(selected)
    }
}

fn select_by_ids(pool: Vec<VmPoolEntry>, ids: &[String]) -> OneResult<Vec<VmPoolEntry>> {
    let mut remaining = ids.to_vec();
    let mut selected = Vec::new();

    for vm in pool {
        if remaining.is_empty() {
            break;
        }
        let id = vm.id.to_string();
        if let Some(position) = remaining.iter().position(|requested| *requested == id) {
            remaining.remove(position);
            selected.push(vm);
        }
    }

    if !remaining.is_empty() {
        return Err(OneError::NotFound(format!(
            "There is no VM(s) with id(s)={}",
            remaining.join(", ")
        )));
    }
    Ok(selected)
}
