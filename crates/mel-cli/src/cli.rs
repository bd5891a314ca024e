use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mel",
    about = "Member Escrow Ledger — owner-managed escrow balances",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Ledger file to operate on.
    #[arg(long, global = true, default_value = "mel.json")]
    pub file: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new ledger file with a fixed owner
    Init(InitArgs),
    /// Whitelist a member (owner only)
    Whitelist(MemberArgs),
    /// Blacklist a member (owner only)
    Blacklist(MemberArgs),
    /// Split a deposit evenly across all whitelisted members (owner only)
    DepositSplit(DepositSplitArgs),
    /// Deposit to one specific address (owner only)
    Deposit(DepositArgs),
    /// Withdraw from the caller's own balance (members only)
    Withdraw(WithdrawArgs),
    /// Show the membership status of an address
    Status(AddrArgs),
    /// Show the balance of an address
    Balance(AddrArgs),
    /// Show the ledger owner
    Owner,
    /// List whitelisted members in admission order
    Roster,
    /// Show the ledger event log
    Log,
    /// Check ledger invariants and snapshot integrity
    Verify,
}

#[derive(Args)]
pub struct InitArgs {
    /// Owner identity: a label or an esc:/hex address.
    #[arg(long)]
    pub owner: String,
}

#[derive(Args)]
pub struct MemberArgs {
    /// Target address (label or esc:/hex).
    pub target: String,
    /// Caller identity, as authenticated by the environment.
    #[arg(long = "as", value_name = "CALLER")]
    pub caller: String,
}

#[derive(Args)]
pub struct DepositSplitArgs {
    /// Amount in coins, e.g. "2" or "0.5".
    pub amount: String,
    #[arg(long = "as", value_name = "CALLER")]
    pub caller: String,
}

#[derive(Args)]
pub struct DepositArgs {
    /// Target address (label or esc:/hex).
    pub target: String,
    /// Amount in coins, e.g. "2" or "0.5".
    pub amount: String,
    #[arg(long = "as", value_name = "CALLER")]
    pub caller: String,
}

#[derive(Args)]
pub struct WithdrawArgs {
    /// Amount in coins, e.g. "2" or "0.5".
    pub amount: String,
    #[arg(long = "as", value_name = "CALLER")]
    pub caller: String,
}

#[derive(Args)]
pub struct AddrArgs {
    /// Address to inspect (label or esc:/hex).
    pub addr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["mel", "init", "--owner", "treasury"]).unwrap();
        if let Command::Init(args) = cli.command {
            assert_eq!(args.owner, "treasury");
        } else {
            panic!("wrong command");
        }
        assert_eq!(cli.file, "mel.json");
    }

    #[test]
    fn parse_custom_file() {
        let cli = Cli::try_parse_from(["mel", "--file", "/tmp/x.json", "owner"]).unwrap();
        assert_eq!(cli.file, "/tmp/x.json");
    }

    #[test]
    fn parse_whitelist_with_caller() {
        let cli = Cli::try_parse_from(["mel", "whitelist", "alice", "--as", "treasury"]).unwrap();
        if let Command::Whitelist(args) = cli.command {
            assert_eq!(args.target, "alice");
            assert_eq!(args.caller, "treasury");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_deposit_split() {
        let cli =
            Cli::try_parse_from(["mel", "deposit-split", "2", "--as", "treasury"]).unwrap();
        if let Command::DepositSplit(args) = cli.command {
            assert_eq!(args.amount, "2");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_deposit_target_and_amount() {
        let cli =
            Cli::try_parse_from(["mel", "deposit", "alice", "0.5", "--as", "treasury"]).unwrap();
        if let Command::Deposit(args) = cli.command {
            assert_eq!(args.target, "alice");
            assert_eq!(args.amount, "0.5");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_withdraw() {
        let cli = Cli::try_parse_from(["mel", "withdraw", "0.5", "--as", "alice"]).unwrap();
        if let Command::Withdraw(args) = cli.command {
            assert_eq!(args.amount, "0.5");
            assert_eq!(args.caller, "alice");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn mutating_commands_require_caller() {
        assert!(Cli::try_parse_from(["mel", "whitelist", "alice"]).is_err());
        assert!(Cli::try_parse_from(["mel", "withdraw", "1"]).is_err());
    }

    #[test]
    fn parse_reads() {
        assert!(matches!(
            Cli::try_parse_from(["mel", "status", "alice"]).unwrap().command,
            Command::Status(_)
        ));
        assert!(matches!(
            Cli::try_parse_from(["mel", "balance", "alice"]).unwrap().command,
            Command::Balance(_)
        ));
        assert!(matches!(
            Cli::try_parse_from(["mel", "owner"]).unwrap().command,
            Command::Owner
        ));
        assert!(matches!(
            Cli::try_parse_from(["mel", "roster"]).unwrap().command,
            Command::Roster
        ));
        assert!(matches!(
            Cli::try_parse_from(["mel", "log"]).unwrap().command,
            Command::Log
        ));
        assert!(matches!(
            Cli::try_parse_from(["mel", "verify"]).unwrap().command,
            Command::Verify
        ));
    }
}
