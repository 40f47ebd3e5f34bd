// crates/valset-cli/src/commands/voting_power.rs
//
// `valset voting-power`: evaluate the voting-power formula for one stake.

use clap::Args;
use serde_json::json;
use valset_core::decimal::BigNumDecimal;
use valset_core::voting_power::calculate_voting_power;
use valset_economics::TokenAmount;

use crate::output::{format_json, OutputFormat};

/// Arguments for `valset voting-power`.
#[derive(Debug, Args)]
pub struct VotingPowerCmd {
    /// Staked amount in wei (18 decimals).
    #[arg(long)]
    pub stake: String,

    /// Exponent numerator.
    #[arg(long, default_value_t = 8500)]
    pub exp_num: u64,

    /// Exponent denominator.
    #[arg(long, default_value_t = 10000)]
    pub exp_den: u64,
}

/// Run the voting-power command.
pub fn run(cmd: &VotingPowerCmd, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let stake: TokenAmount = cmd.stake.parse()?;
    let exponent = BigNumDecimal::new(cmd.exp_num, cmd.exp_den);
    let power = calculate_voting_power(&stake.wei, &exponent)?;

    if *format == OutputFormat::Json {
        let out = json!({
            "stake": stake.wei.to_string(),
            "exponent": exponent,
            "voting_power": power.to_string(),
        });
        println!("{}", format_json(&out));
        return Ok(());
    }

    println!("Stake:         {} ({} wei)", stake, stake.wei);
    println!("Exponent:      {}", exponent);
    println!("Voting power:  {}", power);

    Ok(())
}
