use clap::Parser;

/// Matchup win-probability simulation service
#[derive(Parser, Debug, Clone)]
#[command(name = "matchup-sim", version, about)]
pub struct Config {
    /// Supabase project URL (PostgREST endpoint root)
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: String,

    /// Supabase service key, sent as the apikey/Authorization headers
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub supabase_key: String,

    /// Backing-store table holding one row per (team, year)
    #[arg(long, env = "STORE_TABLE", default_value = "march_madness_sq")]
    pub table: String,

    /// Path to the trained XGBoost JSON model artifact
    #[arg(long, env = "MODEL_PATH", default_value = "march_madness_sq.model.json")]
    pub model_path: String,

    /// HTTP listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    pub listen_addr: String,

    /// Simulation count used when a caller omits num_simulations
    #[arg(long, env = "DEFAULT_SIMULATIONS", default_value = "10000")]
    pub default_simulations: u32,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.supabase_url.trim().is_empty() {
            anyhow::bail!("SUPABASE_URL must not be empty");
        }
        if self.supabase_key.trim().is_empty() {
            anyhow::bail!("SUPABASE_KEY must not be empty");
        }
        if self.default_simulations == 0 {
            anyhow::bail!("default_simulations must be at least 1");
        }
        Ok(())
    }
}
