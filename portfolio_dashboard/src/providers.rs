//! Maps the configured provider to a concrete [`DataProvider`].
use market_data_ingestor::providers::{
    DataProvider, ProviderInitError, alpaca_rest::AlpacaProvider, file::JsonFileProvider,
};

use crate::config::ProviderCfg;

/// Builds the boxed data provider described by `cfg`.
pub fn build_provider(
    cfg: &ProviderCfg,
) -> Result<Box<dyn DataProvider + Send + Sync>, ProviderInitError> {
    match cfg {
        ProviderCfg::Alpaca {
            requests_per_minute,
        } => {
            let mut p = AlpacaProvider::new()?;
            if let Some(rpm) = requests_per_minute {
                p = p.with_requests_per_minute(*rpm);
            }
            Ok(Box::new(p))
        }
        ProviderCfg::File { path } => Ok(Box::new(JsonFileProvider::new(path.clone()))),
    }
}
