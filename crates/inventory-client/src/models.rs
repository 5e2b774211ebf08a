//! Inventory API models
//!
//! These models match the inventory web API payloads consumed by the builders.

/// vSphere inventory models
pub mod vsphere {
    use crate::inventory_trait::InventoryResource;
    use serde::{Deserialize, Serialize};

    /// Reference to another inventory object
    #[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
    #[serde(rename_all = "camelCase")]
    pub struct Ref {
        /// Object kind (e.g. "Host")
        #[serde(default)]
        pub kind: String,
        /// Object ID
        #[serde(default)]
        pub id: String,
    }

    /// Virtual disk
    #[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
    #[serde(rename_all = "camelCase")]
    pub struct Disk {
        /// Backing file (e.g. "[datastore1] vm/vm.vmdk")
        #[serde(default)]
        pub file: String,
        /// Datastore holding the disk
        #[serde(default)]
        pub datastore: Ref,
        /// Capacity in bytes
        #[serde(default)]
        pub capacity: i64,
        /// Whether the disk is shared between VMs
        #[serde(default)]
        pub shared: bool,
    }

    /// vSphere VM descriptor
    #[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
    #[serde(rename_all = "camelCase")]
    pub struct Vm {
        /// Inventory ID (managed object reference)
        #[serde(default)]
        pub id: String,
        /// Display name
        #[serde(default)]
        pub name: String,
        /// BIOS UUID
        #[serde(default)]
        pub uuid: String,
        /// Host running the VM
        #[serde(default)]
        pub host: Ref,
        /// Disks in inventory order
        #[serde(default)]
        pub disks: Vec<Disk>,
    }

    impl InventoryResource for Vm {
        fn path(id: &str) -> String {
            format!("vms/{}", urlencoding::encode(id))
        }
    }
}
