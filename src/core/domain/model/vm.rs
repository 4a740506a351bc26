//! Domain models for OpenNebula virtual machine documents.
//!
//! This module defines the typed views of the `<VM_POOL>` and `<VM>` documents
//! returned by `one.vmpool.info` and `one.vm.info`, together with one decoding
//! function per sub-tree shape.

use crate::core::domain::error::{OneError, OneResult};
use crate::core::infrastructure::xml_document::XmlElement;
use std::collections::BTreeMap;

/// Reserved user template key holding comma-separated labels.
const LABELS_KEY: &str = "LABELS";

/// A virtual machine as listed by the pool call.
#[derive(Debug, Clone, PartialEq)]
pub struct VmPoolEntry {
    /// The VM identifier.
    pub id: u32,
    /// Human-readable name.
    pub name: String,
}

impl VmPoolEntry {
    /// Decodes a `<VM_POOL>` document into its entries, in document order.
    pub fn list_from_xml(xml: &str) -> OneResult<Vec<Self>> {
        let root = XmlElement::parse(xml)?;
        if root.name != "VM_POOL" {
            return Err(OneError::Parse(format!(
                "Expected <VM_POOL>, got <{}>",
                root.name
            )));
        }
        root.children_named("VM")
            .map(|vm| {
                Ok(Self {
                    id: vm.required_parse("ID")?,
                    name: vm.required_text("NAME")?.to_string(),
                })
            })
            .collect()
    }
}

/// The full detail document of one VM from `one.vm.info`.
#[derive(Debug, Clone, PartialEq)]
pub struct VmDetail {
    pub id: u32,
    pub name: String,
    /// Owner user id.
    pub uid: u32,
    /// Owner user name.
    pub uname: String,
    /// Group id.
    pub gid: u32,
    /// Group name.
    pub gname: String,
    /// Numeric VM state code.
    pub state: u32,
    /// Numeric LCM state code, meaningful only while `state` is ACTIVE.
    pub lcm_state: u32,
    /// Creation time in seconds since the UNIX epoch.
    pub stime: i64,
    pub permissions: PermissionSet,
    pub template: VmTemplate,
    pub user_template: UserTemplate,
}

impl VmDetail {
    /// Decodes a `<VM>` document.
    pub fn from_xml(xml: &str) -> OneResult<Self> {
        let root = XmlElement::parse(xml)?;
        if root.name != "VM" {
            return Err(OneError::Parse(format!(
                "Expected <VM>, got <{}>",
                root.name
            )));
        }
        Self::from_element(&root)
    }

    fn from_element(vm: &XmlElement) -> OneResult<Self> {
        Ok(Self {
            id: vm.required_parse("ID")?,
            name: vm.required_text("NAME")?.to_string(),
            uid: vm.required_parse("UID")?,
            uname: vm.required_text("UNAME")?.to_string(),
            gid: vm.required_parse("GID")?,
            gname: vm.required_text("GNAME")?.to_string(),
            state: vm.required_parse("STATE")?,
            lcm_state: vm.required_parse("LCM_STATE")?,
            stime: vm.required_parse("STIME")?,
            permissions: PermissionSet::from_element(vm.required_child("PERMISSIONS")?)?,
            template: VmTemplate::from_element(vm.required_child("TEMPLATE")?),
            user_template: vm
                .child("USER_TEMPLATE")
                .map(UserTemplate::from_element)
                .unwrap_or_default(),
        })
    }
}

/// Sizing and devices from the VM's `<TEMPLATE>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmTemplate {
    /// Memory in MB.
    pub memory: Option<String>,
    /// CPU share (fraction of a physical CPU).
    pub cpu: Option<String>,
    /// Number of virtual CPUs.
    pub vcpu: Option<String>,
    pub disks: Vec<DiskInfo>,
    pub nics: Vec<NicInfo>,
}

impl VmTemplate {
    /// Reads the template defensively: every field and device list may be absent.
    fn from_element(template: &XmlElement) -> Self {
        let text = |name: &str| template.child_text(name).map(str::to_string);
        Self {
            memory: text("MEMORY"),
            cpu: text("CPU"),
            vcpu: text("VCPU"),
            disks: template
                .children_named("DISK")
                .map(|disk| DiskInfo {
                    size: disk.child_text("SIZE").map(str::to_string),
                })
                .collect(),
            nics: template
                .children_named("NIC")
                .map(|nic| NicInfo {
                    ip: nic.child_text("IP").map(str::to_string),
                    mac: nic.child_text("MAC").map(str::to_string),
                    network: nic.child_text("NETWORK").map(str::to_string),
                    security_groups: nic.child_text("SECURITY_GROUPS").map(str::to_string),
                })
                .collect(),
        }
    }
}

/// A `<DISK>` entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskInfo {
    /// Size in MB.
    pub size: Option<String>,
}

/// A `<NIC>` entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NicInfo {
    pub ip: Option<String>,
    pub mac: Option<String>,
    pub network: Option<String>,
    pub security_groups: Option<String>,
}

/// Use/manage/admin flags for one principal class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionBits {
    pub used: bool,
    pub manage: bool,
    pub admin: bool,
}

impl PermissionBits {
    /// Octal digit with weights use=4, manage=2, admin=1.
    #[must_use]
    pub fn digit(&self) -> u8 {
        u8::from(self.used) * 4 + u8::from(self.manage) * 2 + u8::from(self.admin)
    }
}

/// The nine permission flags of a VM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionSet {
    pub owner: PermissionBits,
    pub group: PermissionBits,
    pub other: PermissionBits,
}

impl PermissionSet {
    /// Decodes the `<PERMISSIONS>` sub-tree. Every flag must be `0` or `1`.
    pub fn from_element(permissions: &XmlElement) -> OneResult<Self> {
        let bits = |class: &str| -> OneResult<PermissionBits> {
            Ok(PermissionBits {
                used: flag(permissions, &format!("{}_U", class))?,
                manage: flag(permissions, &format!("{}_M", class))?,
                admin: flag(permissions, &format!("{}_A", class))?,
            })
        };
        Ok(Self {
            owner: bits("OWNER")?,
            group: bits("GROUP")?,
            other: bits("OTHER")?,
        })
    }

    /// Three-digit mode string, e.g. `"600"`.
    #[must_use]
    pub fn mode(&self) -> String {
        format!(
            "{}{}{}",
            self.owner.digit(),
            self.group.digit(),
            self.other.digit()
        )
    }
}

fn flag(permissions: &XmlElement, name: &str) -> OneResult<bool> {
    match permissions.required_text(name)?.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(OneError::Parse(format!(
            "Permission flag {} has invalid value '{}'",
            name, other
        ))),
    }
}

/// Labels and free-form attributes from the `<USER_TEMPLATE>` sub-tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserTemplate {
    pub labels: Vec<String>,
    pub attributes: BTreeMap<String, String>,
}

impl UserTemplate {
    /// Splits out the reserved `LABELS` field; every other child becomes an attribute.
    pub fn from_element(user_template: &XmlElement) -> Self {
        let mut template = Self::default();
        for child in &user_template.children {
            if child.name == LABELS_KEY {
                if !child.text.is_empty() {
                    template.labels = child.text.split(',').map(str::to_string).collect();
                }
            } else {
                template
                    .attributes
                    .insert(child.name.clone(), child.text.clone());
            }
        }
        template
    }
}
