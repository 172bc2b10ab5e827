#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use cirrus_core::models::{
    AgentPool, AgentPoolMode, Image, NetworkInterface, ProvisioningState, VirtualMachine,
};
use cirrus_core::tags::Tags;
use cirrus_provisioner::{
    AgentPoolSpec, BoxFuture, Completed, NetworkInterfaceSpec, Operation, OperationHandle,
    OsDiskSpec, ProvisionerError, ResourceClient, ResourceRef, ResourceSpec, VirtualMachineSpec,
    WaitOptions,
};

/// Provider-side bookkeeping a fake applies to stored objects.
pub trait Settle: Sized {
    fn settle(self, id: String) -> Self;
    fn set_state(&mut self, state: ProvisioningState);
}

impl Settle for AgentPool {
    fn settle(mut self, id: String) -> Self {
        self.id = Some(id);
        self.set_state(ProvisioningState::Succeeded);
        self
    }

    fn set_state(&mut self, state: ProvisioningState) {
        self.properties.get_or_insert_with(Default::default).provisioning_state = Some(state);
    }
}

impl Settle for VirtualMachine {
    fn settle(mut self, id: String) -> Self {
        self.id = Some(id);
        self.set_state(ProvisioningState::Succeeded);
        self
    }

    fn set_state(&mut self, state: ProvisioningState) {
        self.properties.get_or_insert_with(Default::default).provisioning_state = Some(state);
    }
}

impl Settle for NetworkInterface {
    fn settle(mut self, id: String) -> Self {
        self.id = Some(id);
        self.set_state(ProvisioningState::Succeeded);
        self
    }

    fn set_state(&mut self, state: ProvisioningState) {
        self.properties.get_or_insert_with(Default::default).provisioning_state = Some(state);
    }
}

#[derive(Debug, Clone)]
pub enum Call<T> {
    Get(String),
    CreateOrUpdate {
        name: String,
        payload: T,
        headers: BTreeMap<String, String>,
    },
    Delete(String),
}

struct FakeState<T> {
    objects: HashMap<String, T>,
    calls: Vec<Call<T>>,
    get_error: Option<String>,
    submit_error: Option<String>,
    wait_error: Option<String>,
    hang_wait: bool,
}

/// In-memory provider for one resource kind. Clones share state.
pub struct FakeClient<S: ResourceSpec> {
    state: Arc<Mutex<FakeState<S::Object>>>,
}

impl<S: ResourceSpec> Clone for FakeClient<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: ResourceSpec> Default for FakeClient<S> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                objects: HashMap::new(),
                calls: Vec::new(),
                get_error: None,
                submit_error: None,
                wait_error: None,
                hang_wait: false,
            })),
        }
    }
}

impl<S: ResourceSpec> FakeClient<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: &str, object: S::Object) {
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(name.to_string(), object);
    }

    pub fn object(&self, name: &str) -> Option<S::Object> {
        self.state.lock().unwrap().objects.get(name).cloned()
    }

    pub fn calls(&self) -> Vec<Call<S::Object>> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn submissions(&self) -> Vec<S::Object> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateOrUpdate { payload, .. } => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Delete(_)))
            .count()
    }

    pub fn fail_get(&self, message: &str) {
        self.state.lock().unwrap().get_error = Some(message.to_string());
    }

    pub fn fail_submit(&self, message: &str) {
        self.state.lock().unwrap().submit_error = Some(message.to_string());
    }

    pub fn fail_wait(&self, message: &str) {
        self.state.lock().unwrap().wait_error = Some(message.to_string());
    }

    pub fn hang_wait(&self) {
        self.state.lock().unwrap().hang_wait = true;
    }
}

fn not_found(kind: &str, resource: &ResourceRef) -> ProvisionerError {
    ProvisionerError::NotFound {
        kind: kind.to_string(),
        resource_group: resource.resource_group.clone(),
        name: resource.name.clone(),
    }
}

fn transport(message: String) -> ProvisionerError {
    ProvisionerError::Transport {
        status: Some(500),
        message,
    }
}

/// An operation whose wait fails, e.g. the remote PUT ended in `Failed`.
struct FailingOperation {
    message: String,
}

impl<T: Send + 'static> Operation<T> for FailingOperation {
    fn wait(&mut self, _options: WaitOptions) -> BoxFuture<'_, Result<(), ProvisionerError>> {
        Box::pin(async { Err(transport(self.message.clone())) })
    }

    fn result(&mut self) -> BoxFuture<'_, Result<T, ProvisionerError>> {
        Box::pin(async { Err(transport(self.message.clone())) })
    }
}

/// An operation that never completes.
struct HangingOperation;

impl<T: Send + 'static> Operation<T> for HangingOperation {
    fn wait(&mut self, _options: WaitOptions) -> BoxFuture<'_, Result<(), ProvisionerError>> {
        Box::pin(std::future::pending())
    }

    fn result(&mut self) -> BoxFuture<'_, Result<T, ProvisionerError>> {
        Box::pin(std::future::pending())
    }
}

impl<S> ResourceClient<S> for FakeClient<S>
where
    S: ResourceSpec,
    S::Object: Settle,
{
    fn get<'a>(
        &'a self,
        resource: &'a ResourceRef,
    ) -> BoxFuture<'a, Result<S::Object, ProvisionerError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Get(resource.name.clone()));
            if let Some(message) = &state.get_error {
                return Err(transport(message.clone()));
            }
            state
                .objects
                .get(&resource.name)
                .cloned()
                .ok_or_else(|| not_found(S::KIND, resource))
        })
    }

    fn create_or_update<'a>(
        &'a self,
        resource: &'a ResourceRef,
        payload: S::Object,
        headers: &'a BTreeMap<String, String>,
    ) -> BoxFuture<'a, Result<OperationHandle<S::Object>, ProvisionerError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::CreateOrUpdate {
                name: resource.name.clone(),
                payload: payload.clone(),
                headers: headers.clone(),
            });
            if let Some(message) = &state.submit_error {
                return Err(transport(message.clone()));
            }
            if let Some(message) = &state.wait_error {
                let op: OperationHandle<S::Object> = Box::new(FailingOperation {
                    message: message.clone(),
                });
                return Ok(op);
            }
            if state.hang_wait {
                let op: OperationHandle<S::Object> = Box::new(HangingOperation);
                return Ok(op);
            }

            let stored = payload.settle(format!(
                "/subscriptions/sub/resourceGroups/{}/{}",
                resource.resource_group, resource.name
            ));
            state.objects.insert(resource.name.clone(), stored.clone());
            Ok(Completed::boxed(stored))
        })
    }

    fn delete<'a>(
        &'a self,
        resource: &'a ResourceRef,
    ) -> BoxFuture<'a, Result<OperationHandle<()>, ProvisionerError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Delete(resource.name.clone()));
            if let Some(message) = &state.submit_error {
                return Err(transport(message.clone()));
            }
            match state.objects.remove(&resource.name) {
                Some(_) => Ok(Completed::boxed(())),
                None => Err(not_found(S::KIND, resource)),
            }
        })
    }
}

pub fn agent_pool_spec() -> AgentPoolSpec {
    AgentPoolSpec {
        name: "pool1".into(),
        resource_group: "my-rg".into(),
        cluster: "my-cluster".into(),
        version: Some("1.30.1".into()),
        sku: "Standard_D2s_v3".into(),
        replicas: 3,
        os_disk_size_gb: 128,
        vnet_subnet_id: "/subscriptions/sub/resourceGroups/my-rg/providers/Microsoft.Network/virtualNetworks/vnet/subnets/nodes".into(),
        mode: AgentPoolMode::User,
        max_count: None,
        min_count: None,
        node_labels: Some(BTreeMap::from([("workload".to_string(), "batch".to_string())])),
        node_taints: vec!["dedicated=batch:NoSchedule".into()],
        enable_auto_scaling: None,
        availability_zones: vec!["1".into(), "2".into()],
        max_pods: Some(30),
        os_disk_type: Some("Managed".into()),
        enable_ultra_ssd: None,
        os_type: Some("Linux".into()),
        headers: BTreeMap::new(),
        enable_node_public_ip: None,
        node_public_ip_prefix_id: None,
        scale_set_priority: None,
    }
}

pub fn nic_spec() -> NetworkInterfaceSpec {
    NetworkInterfaceSpec {
        name: "machine-0-nic".into(),
        resource_group: "my-rg".into(),
        location: "westeurope".into(),
        subnet_id: "/subscriptions/sub/resourceGroups/my-rg/providers/Microsoft.Network/virtualNetworks/vnet/subnets/nodes".into(),
        static_ip_address: None,
        accelerated_networking: Some(true),
        backend_address_pool_ids: vec![],
        tags: Tags::new(),
    }
}

pub fn vm_spec() -> VirtualMachineSpec {
    VirtualMachineSpec {
        name: "machine-0".into(),
        resource_group: "my-rg".into(),
        location: "westeurope".into(),
        nic_name: "machine-0-nic".into(),
        ssh_public_key: Some("ssh-rsa AAAAB3NzaC1yc2E test".into()),
        admin_password: Some("hunter2hunter2".into()),
        size: "Standard_D2s_v3".into(),
        zone: Some("1".into()),
        image: Image {
            publisher: Some("cncf-upstream".into()),
            offer: Some("capi".into()),
            sku: Some("k8s-1dot30dot1-ubuntu-2204".into()),
            version: Some("latest".into()),
            ..Default::default()
        },
        os_disk: OsDiskSpec {
            os_type: "Linux".into(),
            disk_size_gb: 128,
            storage_account_type: "Premium_LRS".into(),
        },
        custom_data: Some("I2Nsb3VkLWNvbmZpZw==".into()),
        tags: VirtualMachineSpec::machine_tags("my-cluster", "machine-0", "node", &Tags::new()),
    }
}
