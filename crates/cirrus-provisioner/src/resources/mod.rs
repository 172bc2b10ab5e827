pub mod agent_pool;
pub mod network_interface;
pub mod virtual_machine;

pub use agent_pool::AgentPoolSpec;
pub use network_interface::NetworkInterfaceSpec;
pub use virtual_machine::{OsDiskSpec, VirtualMachineSpec};
