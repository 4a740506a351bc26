//! The user-facing fact record emitted for each selected VM.

use crate::core::domain::{
    error::{OneError, OneResult},
    model::{
        vm::{NicInfo, VmDetail},
        vm_state::{lcm_state_label, state_label},
    },
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

const SECONDS_PER_HOUR: i64 = 60 * 60;

/// Normalized facts about one virtual machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VmFact {
    pub id: u32,
    pub name: String,
    /// Coarse state name, e.g. `ACTIVE`.
    pub state: &'static str,
    /// LCM sub-state name; `null` unless `state` is `ACTIVE`.
    pub lcm_state: Option<&'static str>,
    pub owner_id: u32,
    pub owner_name: String,
    pub group_id: u32,
    pub group_name: String,
    pub networks: Vec<NetworkFact>,
    /// Size of the first disk, e.g. `"10240 MB"`, or empty without disks.
    pub disk_size: String,
    /// Memory, e.g. `"1024 MB"`.
    pub memory: String,
    pub vcpu: Option<String>,
    pub cpu: String,
    /// Whole hours since creation.
    pub uptime_h: i64,
    pub attributes: BTreeMap<String, String>,
    /// Three-digit permission mode, e.g. `"600"`.
    pub mode: String,
    pub labels: Vec<String>,
}

/// One network interface of a VM.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkFact {
    pub ip: Option<String>,
    pub mac: Option<String>,
    pub name: Option<String>,
    pub security_groups: Option<String>,
}

impl From<&NicInfo> for NetworkFact {
    fn from(nic: &NicInfo) -> Self {
        Self {
            ip: nic.ip.clone(),
            mac: nic.mac.clone(),
            name: nic.network.clone(),
            security_groups: nic.security_groups.clone(),
        }
    }
}

impl VmFact {
    /// Projects a detail document into a fact record.
    ///
    /// `now` is the reference time for `uptime_h`; callers capture it once per
    /// invocation so every record shares the same clock reading.
    ///
    /// # Errors
    ///
    /// Returns [`OneError::Parse`] if a state code is out of range or the
    /// template lacks `MEMORY` or `CPU`.
    pub fn from_detail(vm: &VmDetail, now: DateTime<Utc>) -> OneResult<Self> {
        let memory = vm.template.memory.as_deref().ok_or_else(|| {
            OneError::Parse(format!("VM {} template has no MEMORY", vm.id))
        })?;
        let cpu = vm
            .template
            .cpu
            .clone()
            .ok_or_else(|| OneError::Parse(format!("VM {} template has no CPU", vm.id)))?;

        let disk_size = vm
            .template
            .disks
            .first()
            .and_then(|disk| disk.size.as_deref())
            .map(|size| format!("{} MB", size))
            .unwrap_or_default();

        Ok(Self {
            id: vm.id,
            name: vm.name.clone(),
            state: state_label(vm.state)?,
            lcm_state: lcm_state_label(vm.state, vm.lcm_state)?,
            owner_id: vm.uid,
            owner_name: vm.uname.clone(),
            group_id: vm.gid,
            group_name: vm.gname.clone(),
            networks: vm.template.nics.iter().map(NetworkFact::from).collect(),
            disk_size,
            memory: format!("{} MB", memory),
            vcpu: vm.template.vcpu.clone(),
            cpu,
            uptime_h: uptime_hours(vm.stime, now),
            attributes: vm.user_template.attributes.clone(),
            mode: vm.permissions.mode(),
            labels: vm.user_template.labels.clone(),
        })
    }
}

/// Whole hours between `stime` (UNIX seconds) and `now`, truncated.
///
/// Both ends are plain epoch seconds, so the result does not depend on the
/// host or server time zone. A creation time in the future yields 0.
pub fn uptime_hours(stime: i64, now: DateTime<Utc>) -> i64 {
    now.timestamp().saturating_sub(stime).max(0) / SECONDS_PER_HOUR
}
