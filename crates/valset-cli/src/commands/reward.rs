// crates/valset-cli/src/commands/reward.rs
//
// `valset reward`: evaluate the maximum epoch reward from explicit inputs.

use clap::Args;
use num_bigint::BigUint;
use serde_json::json;
use valset_economics::{calc_max_reward, vesting_bonus, TokenAmount, MAX_VESTING_WEEKS};

use crate::output::{format_json, OutputFormat};

/// Arguments for `valset reward`.
#[derive(Debug, Args)]
pub struct RewardCmd {
    /// Total staked balance in wei (18 decimals).
    #[arg(long)]
    pub staked: String,

    /// Base reward numerator (scaled by 10000).
    #[arg(long)]
    pub base: u64,

    /// Maximum RSI bonus (scaled by 10000).
    #[arg(long)]
    pub rsi: u64,

    /// Macro factor (scaled by 10000).
    #[arg(long = "macro")]
    pub macro_factor: u64,

    /// Vesting period in weeks (1-52).
    #[arg(long, default_value_t = MAX_VESTING_WEEKS)]
    pub vesting_weeks: u64,
}

/// Run the reward command.
pub fn run(cmd: &RewardCmd, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let staked: TokenAmount = cmd.staked.parse()?;
    let vesting = vesting_bonus(cmd.vesting_weeks)?;

    let reward = TokenAmount::from_wei(calc_max_reward(
        &staked.wei,
        &BigUint::from(cmd.base),
        &BigUint::from(vesting),
        &BigUint::from(cmd.rsi),
        &BigUint::from(cmd.macro_factor),
    ));

    if *format == OutputFormat::Json {
        let out = json!({
            "staked": staked.wei.to_string(),
            "base": cmd.base,
            "vesting_weeks": cmd.vesting_weeks,
            "vesting_bonus": vesting,
            "rsi": cmd.rsi,
            "macro": cmd.macro_factor,
            "reward": reward.wei.to_string(),
        });
        println!("{}", format_json(&out));
        return Ok(());
    }

    println!("Staked:          {}", staked);
    println!("Base reward:     {}", cmd.base);
    println!("Vesting bonus:   {} ({} weeks)", vesting, cmd.vesting_weeks);
    println!("Max RSI:         {}", cmd.rsi);
    println!("Macro factor:    {}", cmd.macro_factor);
    println!("Max reward:      {} ({} wei)", reward, reward.wei);

    Ok(())
}
