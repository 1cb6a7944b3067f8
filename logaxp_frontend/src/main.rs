use anyhow::Context;
use logaxp_frontend::FrontendConfig;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = FrontendConfig::from_env().context("invalid LOGAXP_* configuration")?;
    logaxp_frontend::run_frontend(config)
}
