use serde::Deserialize;

#[derive(Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub postgres: PostgresConfig,
    pub xumm: XummConfig,
    pub xrpl: XrplConfig,
}

#[derive(Deserialize)]
pub struct PostgresConfig {
    pub uri: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct XummConfig {
    pub api_key: String,
    pub api_secret: String,
    #[serde(default = "default_xumm_base_url")]
    pub base_url: String,
}

fn default_xumm_base_url() -> String {
    "https://xumm.app/api/v1".to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct XrplConfig {
    pub json_rpc_url: String,
    /// Classic address of the platform account NFTs are minted from.
    pub minter_address: String,
    /// Seed of the minting account; the gateway signs with it.
    pub minter_seed: String,
}
