use crate::encoding::{
    batch::BatchLimits, contract_factory::ContractFactory, errors::EncodingError,
    evm::client::HyperClient,
};

/// Builder pattern for constructing a `HyperClient` with customizable options.
///
/// Both contract factories are required. Batch limits default to `config/batch_limits.json`.
pub struct HyperClientBuilder {
    hyper_factory: Option<Box<dyn ContractFactory>>,
    forwarder_factory: Option<Box<dyn ContractFactory>>,
    batch_limits: Option<BatchLimits>,
    batch_limits_file_path: Option<String>,
}

impl Default for HyperClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperClientBuilder {
    pub fn new() -> Self {
        HyperClientBuilder {
            hyper_factory: None,
            forwarder_factory: None,
            batch_limits: None,
            batch_limits_file_path: None,
        }
    }

    pub fn hyper_factory(mut self, factory: Box<dyn ContractFactory>) -> Self {
        self.hyper_factory = Some(factory);
        self
    }

    pub fn forwarder_factory(mut self, factory: Box<dyn ContractFactory>) -> Self {
        self.forwarder_factory = Some(factory);
        self
    }

    /// Sets the `batch_limits` manually. Takes precedence over `batch_limits_file_path`.
    pub fn batch_limits(mut self, batch_limits: BatchLimits) -> Self {
        self.batch_limits = Some(batch_limits);
        self
    }

    /// Sets the `batch_limits_file_path` manually.
    /// If it's not set, the default limits will be used (config/batch_limits.json)
    pub fn batch_limits_file_path(mut self, batch_limits_file_path: String) -> Self {
        self.batch_limits_file_path = Some(batch_limits_file_path);
        self
    }

    /// Builds an undeployed `HyperClient`.
    /// Returns an error if either factory has not been set.
    pub fn build(self) -> Result<HyperClient, EncodingError> {
        match (self.hyper_factory, self.forwarder_factory) {
            (Some(hyper_factory), Some(forwarder_factory)) => {
                let batch_limits = match self.batch_limits {
                    Some(limits) => limits,
                    None => BatchLimits::from_file(self.batch_limits_file_path)?,
                };
                Ok(HyperClient::new(hyper_factory, forwarder_factory, batch_limits))
            }
            _ => Err(EncodingError::FatalError(
                "Please set the hyper and forwarder factories before building the client"
                    .to_string(),
            )),
        }
    }
}
