//! CLI commands

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use surety_catalog::{FlightKey, FlightStatus};
use surety_core::{Amount, Principal};
use surety_gate::Origin;
use surety_oracle::{MockOracle, Resolution};
use surety_registry::AdmissionOutcome;

use crate::context::AppContext;
use crate::service::LedgerService;

/// Print gate and registry summary
pub fn status(ctx: &AppContext) -> Result<(), anyhow::Error> {
    println!("Operational:   {}", ctx.is_operational());
    println!("Controller:    {}", ctx.controller());
    println!("Gateways:      {}", join(ctx.gateways()));
    println!("Oracles:       {}", join(ctx.oracles()));
    println!("Operators:     {} ({} registered)", ctx.operators().len(), ctx.registered_count());
    println!("Flights:       {}", ctx.list_flights().len());
    println!("Pool:          {}", ctx.pool());
    println!("Last sequence: {}", ctx.last_sequence());
    Ok(())
}

pub fn set_operational(ctx: &mut AppContext, origin: &Origin, operational: bool) -> Result<(), anyhow::Error> {
    ctx.set_operational(origin, operational)?;
    let mode = if operational { "operational" } else { "paused" };
    println!("✅ Ledger is now {} (seq: {})", mode, ctx.last_sequence());
    Ok(())
}

pub fn authorize(ctx: &mut AppContext, origin: &Origin, gateway: Principal) -> Result<(), anyhow::Error> {
    let label = gateway.to_string();
    if ctx.authorize(origin, gateway)? {
        println!("✅ Authorized gateway {} (seq: {})", label, ctx.last_sequence());
    } else {
        println!("Gateway {} was already authorized", label);
    }
    Ok(())
}

pub fn deauthorize(ctx: &mut AppContext, origin: &Origin, gateway: &Principal) -> Result<(), anyhow::Error> {
    if ctx.deauthorize(origin, gateway)? {
        println!("✅ Removed gateway {} (seq: {})", gateway, ctx.last_sequence());
    } else {
        println!("Gateway {} was not authorized", gateway);
    }
    Ok(())
}

pub fn add_oracle(ctx: &mut AppContext, origin: &Origin, oracle: Principal) -> Result<(), anyhow::Error> {
    let label = oracle.to_string();
    if ctx.register_oracle(origin, oracle)? {
        println!("✅ Registered oracle {} (seq: {})", label, ctx.last_sequence());
    } else {
        println!("{} already holds the oracle capability", label);
    }
    Ok(())
}

pub fn remove_oracle(ctx: &mut AppContext, origin: &Origin, oracle: &Principal) -> Result<(), anyhow::Error> {
    if ctx.revoke_oracle(origin, oracle)? {
        println!("✅ Revoked oracle {} (seq: {})", oracle, ctx.last_sequence());
    } else {
        println!("{} did not hold the oracle capability", oracle);
    }
    Ok(())
}

pub fn apply(ctx: &mut AppContext, origin: &Origin, name: &str) -> Result<(), anyhow::Error> {
    ctx.apply(origin, name)?;
    println!("✅ {} applied as \"{}\" (seq: {})", origin.caller, name.trim(), ctx.last_sequence());
    Ok(())
}

pub fn admit(ctx: &mut AppContext, origin: &Origin, applicant: &Principal) -> Result<(), anyhow::Error> {
    match ctx.admit(origin, applicant)? {
        AdmissionOutcome::Registered => {
            println!("✅ {} registered (seq: {})", applicant, ctx.last_sequence());
        }
        AdmissionOutcome::VoteRecorded { votes, threshold } => {
            println!(
                "✅ Vote recorded for {}: {}/{} (seq: {})",
                applicant, votes, threshold, ctx.last_sequence()
            );
        }
    }
    Ok(())
}

pub fn fund(ctx: &mut AppContext, origin: &Origin, amount: Amount) -> Result<(), anyhow::Error> {
    ctx.fund(origin, amount)?;
    println!("✅ {} funded with {} (seq: {})", origin.caller, amount, ctx.last_sequence());
    Ok(())
}

pub fn register_flight(
    ctx: &mut AppContext,
    origin: &Origin,
    code: &str,
    departure: DateTime<Utc>,
) -> Result<(), anyhow::Error> {
    let id = ctx.register_flight(origin, code, departure)?;
    let flight = ctx.get_flight_by_id(id)?;
    println!("✅ Flight {} registered as #{} (seq: {})", flight.key, id, ctx.last_sequence());
    Ok(())
}

/// List every registered flight
pub fn flights(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let flights = ctx.list_flights();
    if flights.is_empty() {
        println!("No flights registered");
        return Ok(());
    }

    println!("Flights ({}):", flights.len());
    println!("{:-<90}", "");
    println!("{:>4} | {:<12} | {:<10} | {:<25} | {:<15}", "ID", "Airline", "Code", "Departure", "Status");
    println!("{:-<90}", "");
    for flight in flights {
        println!(
            "{:>4} | {:<12} | {:<10} | {:<25} | {:<15}",
            flight.id,
            flight.key.airline,
            flight.key.code,
            flight.key.departure.to_rfc3339(),
            flight.status
        );
    }
    Ok(())
}

/// Show one flight and its policies
pub fn flight(ctx: &AppContext, key: &FlightKey) -> Result<(), anyhow::Error> {
    let flight = ctx.get_flight(key)?;
    println!("Flight #{}: {}", flight.id, flight.key);
    println!("  Status: {} (code {})", flight.status, flight.status.code());
    println!("  Registered at: {}", flight.registered_at.to_rfc3339());

    let policies = ctx.policies_for(key)?;
    println!("  Policies: {}", policies.len());
    for policy in policies {
        println!(
            "    {} premium={} credit={} resolved={}",
            policy.passenger, policy.premium, policy.payout_credit, policy.resolved
        );
    }
    Ok(())
}

/// List operators with their state and vote count
pub fn operators(ctx: &AppContext) -> Result<(), anyhow::Error> {
    println!("{:<12} | {:<24} | {:<10} | {:>5} | {:>10}", "Operator", "Name", "State", "Votes", "Funding");
    println!("{:-<72}", "");
    for op in ctx.operators() {
        println!(
            "{:<12} | {:<24} | {:<10} | {:>5} | {:>10}",
            op.id,
            op.name,
            op.state,
            op.votes.len(),
            op.funding
        );
    }
    Ok(())
}

pub fn state_of(ctx: &AppContext, operator: &Principal) -> Result<(), anyhow::Error> {
    let state = ctx.state_of(operator)?;
    println!("{}: {} ({})", operator, state, state.code());
    Ok(())
}

pub fn purchase(ctx: &mut AppContext, origin: &Origin, key: &FlightKey, amount: Amount) -> Result<(), anyhow::Error> {
    ctx.purchase(origin, key, amount)?;
    let premium = ctx.policy(key, &origin.caller).map(|p| p.premium).unwrap_or(amount);
    println!(
        "✅ {} insured on {} (premium now {}, seq: {})",
        origin.caller, key, premium, ctx.last_sequence()
    );
    Ok(())
}

pub fn withdraw(ctx: &mut AppContext, origin: &Origin) -> Result<(), anyhow::Error> {
    let amount = ctx.withdraw(origin)?;
    println!("✅ Paid {} to {} (seq: {})", amount, origin.caller, ctx.last_sequence());
    Ok(())
}

pub fn balance(ctx: &AppContext, passenger: &Principal) -> Result<(), anyhow::Error> {
    println!("Balance for {}: {}", passenger, ctx.balance_of(passenger));
    Ok(())
}

pub fn request_status(ctx: &mut AppContext, origin: &Origin, key: &FlightKey) -> Result<(), anyhow::Error> {
    if ctx.request_status(origin, key)? {
        println!("✅ Status requested for {} (seq: {})", key, ctx.last_sequence());
    } else {
        println!("A status request for {} is already open", key);
    }
    Ok(())
}

pub fn report_status(
    ctx: &mut AppContext,
    origin: &Origin,
    key: &FlightKey,
    status: FlightStatus,
) -> Result<(), anyhow::Error> {
    let resolution = ctx.report_status(origin, key, status)?;
    print_resolution(key, &resolution);
    Ok(())
}

/// One entry of a verdict file read by `relay`
#[derive(Debug, Deserialize)]
pub struct Verdict {
    pub airline: Principal,
    pub code: String,
    pub departure: DateTime<Utc>,
    pub status: FlightStatus,
}

/// Load a JSON array of verdicts into a mock oracle
pub fn load_verdicts(path: &Path) -> Result<MockOracle, anyhow::Error> {
    let content = std::fs::read_to_string(path)?;
    let verdicts: Vec<Verdict> = serde_json::from_str(&content)?;

    let oracle = MockOracle::new(path.display().to_string());
    for v in verdicts {
        oracle.set_status(FlightKey::new(v.airline, v.code, v.departure), v.status);
    }
    Ok(oracle)
}

/// Answer every open status request from a verdict file
pub async fn relay(service: &LedgerService, origin: &Origin, verdicts: &Path) -> Result<(), anyhow::Error> {
    let oracle = load_verdicts(verdicts)?;
    let resolutions = service.relay_pending(&oracle, origin).await?;

    if resolutions.is_empty() {
        println!("No pending requests resolved");
        return Ok(());
    }
    for resolution in &resolutions {
        let key = service
            .with_context(|ctx| ctx.get_flight_by_id(resolution.flight).map(|f| f.key.clone()))
            .await?;
        print_resolution(&key, resolution);
    }
    Ok(())
}

/// Verify the journal hash chain
pub fn audit(data: &Path) -> Result<(), anyhow::Error> {
    match AppContext::audit(data) {
        Ok(count) => println!("✅ Hash chain verified ({} records)", count),
        Err(e) => println!("❌ {}", e),
    }
    Ok(())
}

fn print_resolution(key: &FlightKey, resolution: &Resolution) {
    match &resolution.payout {
        Some(payout) => println!(
            "✅ {} resolved as {}: credited {} to {} passengers",
            key,
            resolution.status,
            payout.total,
            payout.credited.len()
        ),
        None => println!("✅ {} resolved as {}", key, resolution.status),
    }
}

fn join(principals: Vec<&Principal>) -> String {
    if principals.is_empty() {
        return "-".to_string();
    }
    principals.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", ")
}
