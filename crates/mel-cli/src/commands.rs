use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;

use mel_ledger::{
    EscrowError, EscrowState, LedgerEvent, LedgerSnapshot, RecordingPayout, StateValidator,
};
use mel_types::{format_coins, parse_coins, Address, Amount, IdentitySource};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let file = cli.file;
    match cli.command {
        Command::Init(args) => cmd_init(&file, args),
        Command::Whitelist(args) => mutate(&file, |state| {
            let target = resolve(&args.target);
            state.set_whitelist(resolve(&args.caller), target)?;
            println!("{} Whitelisted {}", "✓".green().bold(), target.to_string().yellow());
            Ok(())
        }),
        Command::Blacklist(args) => mutate(&file, |state| {
            let target = resolve(&args.target);
            state.blacklist_member(resolve(&args.caller), target)?;
            println!("{} Blacklisted {}", "✓".green().bold(), target.to_string().yellow());
            Ok(())
        }),
        Command::DepositSplit(args) => {
            let amount = coins(&args.amount)?;
            mutate(&file, |state| {
                state.deposit_equally(resolve(&args.caller), amount)?;
                println!(
                    "{} Deposited {} split across {} members",
                    "✓".green().bold(),
                    format_coins(amount).bold(),
                    state.roster().len()
                );
                Ok(())
            })
        }
        Command::Deposit(args) => {
            let amount = coins(&args.amount)?;
            mutate(&file, |state| {
                let target = resolve(&args.target);
                state.deposit_to_member(resolve(&args.caller), target, amount)?;
                println!(
                    "{} Deposited {} to {}",
                    "✓".green().bold(),
                    format_coins(amount).bold(),
                    target.to_string().yellow()
                );
                Ok(())
            })
        }
        Command::Withdraw(args) => {
            let amount = coins(&args.amount)?;
            mutate(&file, |state| {
                let caller = resolve(&args.caller);
                let mut payout = RecordingPayout::new();
                state.withdraw_funds(caller, amount, &mut payout)?;
                println!(
                    "{} Paid out {} to {}; remaining balance {}",
                    "✓".green().bold(),
                    format_coins(amount).bold(),
                    caller.to_string().yellow(),
                    format_coins(state.balance_of(caller))
                );
                Ok(())
            })
        }
        Command::Status(args) => {
            let state = load(&file)?;
            let status = state.status(resolve(&args.addr));
            println!("{} {} ({})", resolve(&args.addr), status.to_string().cyan(), status.as_u8());
            Ok(())
        }
        Command::Balance(args) => {
            let state = load(&file)?;
            let addr = resolve(&args.addr);
            println!("{} {}", addr, format_coins(state.balance_of(addr)).bold());
            Ok(())
        }
        Command::Owner => {
            let state = load(&file)?;
            println!("{}", state.owner().to_string().yellow().bold());
            Ok(())
        }
        Command::Roster => cmd_roster(&file),
        Command::Log => cmd_log(&file),
        Command::Verify => cmd_verify(&file),
    }
}

fn cmd_init(file: &str, args: InitArgs) -> anyhow::Result<()> {
    if Path::new(file).exists() {
        anyhow::bail!("ledger file {file} already exists");
    }
    let owner = resolve(&args.owner);
    save(file, &EscrowState::new(owner))?;
    println!("{} Initialized ledger in {}", "✓".green().bold(), file.bold());
    println!("  Owner: {}", owner.to_string().yellow());
    Ok(())
}

fn cmd_roster(file: &str) -> anyhow::Result<()> {
    let state = load(file)?;
    if state.roster().is_empty() {
        println!("No whitelisted members.");
        return Ok(());
    }
    for (index, member) in state.roster().iter().enumerate() {
        println!(
            "{:>3}. {}  {}",
            index + 1,
            member.to_string().yellow(),
            format_coins(state.balance_of(*member))
        );
    }
    Ok(())
}

fn cmd_log(file: &str) -> anyhow::Result<()> {
    let state = load(file)?;
    if state.events().is_empty() {
        println!("No events.");
        return Ok(());
    }
    for (index, event) in state.events().iter().enumerate() {
        println!("{:>3}. {}", index + 1, describe(event));
    }
    Ok(())
}

fn cmd_verify(file: &str) -> anyhow::Result<()> {
    let snapshot = read_snapshot(file)?;
    let report = StateValidator::validate_snapshot(&snapshot);
    let mark = |ok: bool| if ok { "✓".green() } else { "✗".red() };

    println!("Conservation: {}", mark(report.conservation_holds));
    println!("Roster:       {}", mark(report.roster_consistent));
    println!("Event log:    {}", mark(report.events_consistent));

    if report.is_valid() {
        println!("{} Ledger invariants verified", "✓".green().bold());
        return Ok(());
    }
    for violation in &report.violations {
        eprintln!("{} {}", "✗".red().bold(), violation.description);
    }
    anyhow::bail!("ledger verification failed");
}

fn describe(event: &LedgerEvent) -> String {
    match event {
        LedgerEvent::MemberWhitelisted { member } => {
            format!("whitelisted  {}", member.to_string().yellow())
        }
        LedgerEvent::MemberBlacklisted { member } => {
            format!("blacklisted  {}", member.to_string().yellow())
        }
        LedgerEvent::DepositSplit { amount, shares } => format!(
            "deposit      {} split across {shares} members",
            format_coins(*amount).bold()
        ),
        LedgerEvent::DepositTargeted { target, amount } => format!(
            "deposit      {} to {}",
            format_coins(*amount).bold(),
            target.to_string().yellow()
        ),
        LedgerEvent::Withdrawal { member, amount } => format!(
            "withdrawal   {} by {}",
            format_coins(*amount).bold(),
            member.to_string().yellow()
        ),
    }
}

/// Resolve an address argument: full hex (with optional `esc:` prefix)
/// or, failing that, a label to derive from.
fn resolve(arg: &str) -> Address {
    Address::from_hex(arg)
        .unwrap_or_else(|_| Address::derive(&IdentitySource::Label(arg.to_string())))
}

fn coins(arg: &str) -> anyhow::Result<Amount> {
    parse_coins(arg).with_context(|| format!("cannot parse amount {arg:?}"))
}

/// Load, apply one mutating operation, and save only on success. A ledger
/// failure surfaces its stable reason string as the process error.
fn mutate(
    file: &str,
    op: impl FnOnce(&mut EscrowState) -> Result<(), EscrowError>,
) -> anyhow::Result<()> {
    let mut state = load(file)?;
    op(&mut state).map_err(surface)?;
    save(file, &state)?;
    tracing::debug!(file, events = state.events().len(), "ledger updated");
    Ok(())
}

fn surface(err: EscrowError) -> anyhow::Error {
    eprintln!("{} {err}", "✗".red().bold());
    anyhow::anyhow!("{}", err.reason())
}

fn read_snapshot(file: &str) -> anyhow::Result<LedgerSnapshot> {
    let raw = fs::read_to_string(file).with_context(|| format!("cannot read {file}"))?;
    serde_json::from_str(&raw).with_context(|| format!("cannot parse {file}"))
}

fn load(file: &str) -> anyhow::Result<EscrowState> {
    read_snapshot(file)?.restore().map_err(surface)
}

fn save(file: &str, state: &EscrowState) -> anyhow::Result<()> {
    let snapshot = state.snapshot().map_err(surface)?;
    let raw = serde_json::to_string_pretty(&snapshot).context("cannot encode ledger")?;
    fs::write(file, raw).with_context(|| format!("cannot write {file}"))
}

#[cfg(test)]
mod tests {
    use mel_types::UNIT;

    use super::*;

    struct TempLedger(String);

    impl TempLedger {
        fn new() -> Self {
            let path = std::env::temp_dir().join(format!("mel-{}.json", Address::ephemeral()));
            Self(path.to_string_lossy().into_owned())
        }
    }

    impl Drop for TempLedger {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.0);
        }
    }

    fn run(file: &str, args: &[&str]) -> anyhow::Result<()> {
        use clap::Parser;
        let mut argv = vec!["mel", "--file", file];
        argv.extend(args);
        run_command(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn full_flow_persists_between_invocations() {
        let ledger = TempLedger::new();
        let file = ledger.0.as_str();

        run(file, &["init", "--owner", "treasury"]).unwrap();
        run(file, &["whitelist", "alice", "--as", "treasury"]).unwrap();
        run(file, &["whitelist", "bob", "--as", "treasury"]).unwrap();
        run(file, &["deposit-split", "2", "--as", "treasury"]).unwrap();
        run(file, &["withdraw", "0.5", "--as", "alice"]).unwrap();

        let state = load(file).unwrap();
        assert_eq!(state.balance_of(resolve("alice")), UNIT / 2);
        assert_eq!(state.balance_of(resolve("bob")), UNIT);
        assert_eq!(state.events().len(), 5);

        run(file, &["verify"]).unwrap();
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let ledger = TempLedger::new();
        let file = ledger.0.as_str();
        run(file, &["init", "--owner", "treasury"]).unwrap();
        assert!(run(file, &["init", "--owner", "other"]).is_err());
    }

    #[test]
    fn failures_surface_the_stable_reason() {
        let ledger = TempLedger::new();
        let file = ledger.0.as_str();
        run(file, &["init", "--owner", "treasury"]).unwrap();

        let err = run(file, &["whitelist", "alice", "--as", "mallory"]).unwrap_err();
        assert_eq!(err.to_string(), "NOT AUTHORIZED");

        let err = run(file, &["withdraw", "1", "--as", "mallory"]).unwrap_err();
        assert_eq!(err.to_string(), "whitelisted");
    }

    #[test]
    fn failed_mutation_does_not_touch_the_file() {
        let ledger = TempLedger::new();
        let file = ledger.0.as_str();
        run(file, &["init", "--owner", "treasury"]).unwrap();
        run(file, &["whitelist", "alice", "--as", "treasury"]).unwrap();

        let before = fs::read_to_string(file).unwrap();
        assert!(run(file, &["deposit", "alice", "1", "--as", "mallory"]).is_err());
        assert_eq!(fs::read_to_string(file).unwrap(), before);
    }

    #[test]
    fn resolve_accepts_hex_and_labels() {
        let label = resolve("alice");
        assert_eq!(label, Address::derive(&IdentitySource::Label("alice".into())));
        assert_eq!(resolve(&label.to_hex()), label);
        assert_eq!(resolve(&format!("esc:{}", label.to_hex())), label);
    }
}
