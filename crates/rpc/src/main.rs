//! FlightSurety CLI - Main entry point

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use surety_catalog::{FlightKey, FlightStatus};
use surety_core::{Amount, Principal};
use surety_gate::Origin;
use surety_rpc::{commands, AppContext, LedgerService, SuretyConfig};

#[derive(Parser)]
#[command(name = "surety")]
#[command(about = "FlightSurety - flight delay insurance ledger", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Gateway forwarding the request
    #[arg(long, default_value = "APP", global = true)]
    gateway: Principal,

    /// Principal on whose behalf the request is made
    #[arg(long, default_value = "OWNER", global = true)]
    caller: Principal,

    #[command(subcommand)]
    command: Commands,
}

/// Natural key of a flight
#[derive(Args)]
struct FlightArgs {
    /// Operating airline
    airline: Principal,
    /// Flight code (uppercased)
    code: String,
    /// Scheduled departure (RFC 3339)
    departure: DateTime<Utc>,
}

impl FlightArgs {
    fn key(self) -> FlightKey {
        FlightKey::new(self.airline, self.code, self.departure)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show ledger summary
    Status,

    /// Pause or resume mutating operations (controller only)
    SetOperational {
        #[arg(action = clap::ArgAction::Set)]
        operational: bool,
    },

    /// Authorize a gateway (controller only)
    Authorize { principal: Principal },

    /// Remove a gateway (controller only)
    Deauthorize { principal: Principal },

    /// Grant the oracle capability (controller only)
    AddOracle { oracle: Principal },

    /// Revoke the oracle capability (controller only)
    RemoveOracle { oracle: Principal },

    /// Apply to join as an airline operator
    Apply { name: String },

    /// Admit or vote for an applicant
    Admit { applicant: Principal },

    /// Pay operator funding
    Fund { amount: Amount },

    /// Register a flight operated by the caller
    RegisterFlight {
        code: String,
        /// Scheduled departure (RFC 3339)
        departure: DateTime<Utc>,
    },

    /// List flights
    Flights,

    /// Show one flight and its policies
    Flight {
        #[command(flatten)]
        flight: FlightArgs,
    },

    /// List operators
    Operators,

    /// Show an operator's admission state
    StateOf { operator: Principal },

    /// Buy or top up cover on a flight
    Purchase {
        #[command(flatten)]
        flight: FlightArgs,
        /// Premium to add
        #[arg(long)]
        amount: Amount,
    },

    /// Withdraw the caller's payout balance
    Withdraw,

    /// Show a passenger's payout balance
    Balance { passenger: Principal },

    /// Ask oracles for a flight's status
    RequestStatus {
        #[command(flatten)]
        flight: FlightArgs,
    },

    /// Report a flight's status (oracle only)
    ReportStatus {
        #[command(flatten)]
        flight: FlightArgs,
        /// on_time, airline_delay, weather_delay, technical_delay or other_delay
        #[arg(long)]
        status: FlightStatus,
    },

    /// Resolve pending requests from a verdict file
    Relay {
        /// JSON array of {airline, code, departure, status}
        #[arg(long)]
        verdicts: PathBuf,
    },

    /// Audit the journal (verify hash chain)
    Audit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Audit reads the journal directly so a broken chain can still be reported
    if let Commands::Audit = cli.command {
        return commands::audit(&cli.data);
    }

    let config = match &cli.config {
        Some(path) => SuretyConfig::from_file(path)?,
        None => SuretyConfig::default(),
    };
    let mut ctx = AppContext::open(&cli.data, config)?;
    let origin = Origin::new(cli.gateway, cli.caller);

    match cli.command {
        Commands::Status => commands::status(&ctx)?,
        Commands::SetOperational { operational } => commands::set_operational(&mut ctx, &origin, operational)?,
        Commands::Authorize { principal } => commands::authorize(&mut ctx, &origin, principal)?,
        Commands::Deauthorize { principal } => commands::deauthorize(&mut ctx, &origin, &principal)?,
        Commands::AddOracle { oracle } => commands::add_oracle(&mut ctx, &origin, oracle)?,
        Commands::RemoveOracle { oracle } => commands::remove_oracle(&mut ctx, &origin, &oracle)?,
        Commands::Apply { name } => commands::apply(&mut ctx, &origin, &name)?,
        Commands::Admit { applicant } => commands::admit(&mut ctx, &origin, &applicant)?,
        Commands::Fund { amount } => commands::fund(&mut ctx, &origin, amount)?,
        Commands::RegisterFlight { code, departure } => {
            commands::register_flight(&mut ctx, &origin, &code, departure)?
        }
        Commands::Flights => commands::flights(&ctx)?,
        Commands::Flight { flight } => commands::flight(&ctx, &flight.key())?,
        Commands::Operators => commands::operators(&ctx)?,
        Commands::StateOf { operator } => commands::state_of(&ctx, &operator)?,
        Commands::Purchase { flight, amount } => commands::purchase(&mut ctx, &origin, &flight.key(), amount)?,
        Commands::Withdraw => commands::withdraw(&mut ctx, &origin)?,
        Commands::Balance { passenger } => commands::balance(&ctx, &passenger)?,
        Commands::RequestStatus { flight } => commands::request_status(&mut ctx, &origin, &flight.key())?,
        Commands::ReportStatus { flight, status } => {
            commands::report_status(&mut ctx, &origin, &flight.key(), status)?
        }
        Commands::Relay { verdicts } => {
            let service = LedgerService::new(ctx);
            commands::relay(&service, &origin, &verdicts).await?;
        }
        Commands::Audit => unreachable!("handled before the context is opened"),
    }

    Ok(())
}
