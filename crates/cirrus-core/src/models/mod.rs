pub mod agent_pool;
pub mod image;
pub mod network_interface;
pub mod provisioning;
pub mod virtual_machine;

pub use agent_pool::{AgentPool, AgentPoolMode, AgentPoolProperties};
pub use image::{Image, ImageReference, ResolvedImage};
pub use network_interface::{
    IpConfiguration, IpConfigurationProperties, NetworkInterface, NetworkInterfaceProperties,
    SubResource,
};
pub use provisioning::ProvisioningState;
pub use virtual_machine::{
    HardwareProfile, LinuxConfiguration, ManagedDiskParameters, NetworkInterfaceReference,
    NetworkInterfaceReferenceProperties, NetworkProfile, OsDisk, OsProfile, SshConfiguration,
    SshPublicKey, StorageProfile, VirtualMachine, VirtualMachineProperties,
};
