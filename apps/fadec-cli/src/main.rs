use clap::{Args, Parser, Subcommand};
use fadec_controls::EngineState;
use fadec_core::Real;
use fadec_engine::{BleedConfig, Imbalance, ImbalanceGenerator, ImbalanceSlot, LimitType, idle_baseline, limit_n1};
use fadec_sim::{Scenario, ScenarioRecord, SimError, SimResult, run_scenario};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "fadec-cli")]
#[command(about = "FADEC CLI - turbofan engine control models and scenario runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct AmbientArgs {
    /// Pressure altitude (ft)
    #[arg(long, default_value_t = 0.0)]
    altitude: Real,
    /// Mach number
    #[arg(long, default_value_t = 0.0)]
    mach: Real,
    /// Ambient temperature (°C)
    #[arg(long, default_value_t = 15.0)]
    temperature: Real,
    /// Ambient pressure (hPa)
    #[arg(long, default_value_t = 1013.0)]
    pressure: Real,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the idle baseline at the given conditions
    Idle {
        #[command(flatten)]
        ambient: AmbientArgs,
    },
    /// Print the N1 limit of every rating
    Limits {
        #[command(flatten)]
        ambient: AmbientArgs,
        /// Flex temperature (°C), 0 for none
        #[arg(long, default_value_t = 0.0)]
        flex: Real,
        #[arg(long)]
        packs: bool,
        #[arg(long)]
        nacelle_anti_ice: bool,
        #[arg(long)]
        wing_anti_ice: bool,
    },
    /// Encode, decode or draw engine imbalance codes
    #[command(subcommand)]
    Imbalance(ImbalanceCommands),
    /// Replay a scenario file
    Run {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Print the full record as JSON instead of a summary
        #[arg(long)]
        json: bool,
        /// Write the JSON record to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ImbalanceCommands {
    /// Pack raw slot values into a code
    Encode {
        #[arg(long)]
        engine: u8,
        #[arg(long, default_value_t = 0)]
        egt: u8,
        #[arg(long, default_value_t = 0)]
        fuel_flow: u8,
        #[arg(long, default_value_t = 0)]
        n2: u8,
        #[arg(long, default_value_t = 0)]
        oil_quantity: u8,
        #[arg(long, default_value_t = 0)]
        oil_pressure: u8,
        #[arg(long, default_value_t = 0)]
        oil_pressure_idle: u8,
        #[arg(long, default_value_t = 0)]
        oil_temp_max: u8,
    },
    /// Unpack a code
    Decode { code: Real },
    /// Draw a random imbalance
    Generate {
        #[arg(long, default_value_t = 2)]
        engines: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> SimResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Idle { ambient } => cmd_idle(ambient),
        Commands::Limits {
            ambient,
            flex,
            packs,
            nacelle_anti_ice,
            wing_anti_ice,
        } => cmd_limits(
            ambient,
            flex,
            BleedConfig {
                packs,
                nacelle_anti_ice,
                wing_anti_ice,
            },
        ),
        Commands::Imbalance(cmd) => match cmd {
            ImbalanceCommands::Encode {
                engine,
                egt,
                fuel_flow,
                n2,
                oil_quantity,
                oil_pressure,
                oil_pressure_idle,
                oil_temp_max,
            } => cmd_encode(Imbalance {
                engine,
                egt,
                fuel_flow,
                n2,
                oil_quantity,
                oil_pressure,
                oil_pressure_idle,
                oil_temp_max,
            }),
            ImbalanceCommands::Decode { code } => cmd_decode(code),
            ImbalanceCommands::Generate { engines, seed } => cmd_generate(engines, seed),
        },
        Commands::Run {
            scenario_path,
            json,
            output,
        } => cmd_run(&scenario_path, json, output.as_deref()),
    }
}

fn cmd_idle(a: AmbientArgs) -> SimResult<()> {
    let idle = idle_baseline(a.altitude, a.mach, a.temperature, a.pressure);
    println!("Idle at {} ft, M{:.2}, {} °C, {} hPa:", a.altitude, a.mach, a.temperature, a.pressure);
    println!("  N1  {:>8.2} %", idle.n1);
    println!("  N2  {:>8.2} %", idle.n2);
    println!("  FF  {:>8.1} kg/h", idle.ff);
    println!("  EGT {:>8.1} °C", idle.egt);
    Ok(())
}

fn cmd_limits(a: AmbientArgs, flex: Real, bleed: BleedConfig) -> SimResult<()> {
    println!("N1 limits at {} ft, {} °C, {} hPa:", a.altitude, a.temperature, a.pressure);
    for (label, limit) in [
        ("TO ", LimitType::Takeoff),
        ("GA ", LimitType::GoAround),
        ("CLB", LimitType::Climb),
        ("MCT", LimitType::MaximumContinuous),
    ] {
        let n1 = limit_n1(limit, a.altitude, a.temperature, a.pressure, 0.0, bleed);
        println!("  {label} {n1:>8.2} %");
    }
    if flex > 0.0 {
        let n1 = limit_n1(LimitType::Takeoff, a.altitude, a.temperature, a.pressure, flex, bleed);
        println!("  FLX {n1:>8.2} % ({flex} °C)");
    }
    Ok(())
}

fn print_imbalance(imb: &Imbalance) {
    for slot in ImbalanceSlot::ALL {
        println!("  {:<20} {}", slot.name(), imb.get(slot));
    }
}

fn cmd_encode(imb: Imbalance) -> SimResult<()> {
    let code = imb.encode()?;
    println!("{code}");
    Ok(())
}

fn cmd_decode(code: Real) -> SimResult<()> {
    let imb = Imbalance::decode(code)?;
    println!("Imbalance {code}:");
    print_imbalance(&imb);
    Ok(())
}

fn cmd_generate(engines: usize, seed: Option<u64>) -> SimResult<()> {
    if engines != 2 && engines != 4 {
        return Err(SimError::EngineCount { count: engines });
    }
    let imb = ImbalanceGenerator::new(seed).generate(engines);
    let code = imb.encode()?;
    println!("Imbalance {code}:");
    print_imbalance(&imb);
    Ok(())
}

fn cmd_run(scenario_path: &Path, json: bool, output: Option<&Path>) -> SimResult<()> {
    let scenario = Scenario::load(scenario_path)?;
    info!(name = %scenario.name, engines = scenario.engines, "running scenario");
    let record = run_scenario(&scenario)?;

    if json || output.is_some() {
        let text = serde_json::to_string_pretty(&record).map_err(|e| SimError::Scenario {
            message: format!("serialising record: {e}"),
        })?;
        match output {
            Some(path) => {
                fs::write(path, text).map_err(|e| SimError::Scenario {
                    message: format!("{}: {e}", path.display()),
                })?;
                println!("✓ Record written to {}", path.display());
            }
            None => println!("{text}"),
        }
        return Ok(());
    }

    print_summary(&record);
    Ok(())
}

fn print_summary(record: &ScenarioRecord) {
    println!("Scenario: {}", record.name);
    println!("Imbalance code: {}", record.imbalance_code);
    println!("{:>8}  {:<12} {:>7} {:>7} {:>8} {:>7}", "t (s)", "engine 1", "N1", "N2", "FF", "EGT");

    let mut previous: Option<Vec<EngineState>> = None;
    for sample in &record.samples {
        let changed = previous.as_ref() != Some(&sample.states);
        if let (true, Some(e)) = (changed, sample.engines.first()) {
            println!(
                "{:>8.2}  {:<12} {:>7.2} {:>7.2} {:>8.1} {:>7.1}",
                sample.t,
                format!("{:?}", e.state),
                e.n1,
                e.n2,
                e.fuel_flow,
                e.egt
            );
        }
        previous = Some(sample.states.clone());
    }

    if let Some(last) = record.last() {
        println!("Final at {:.2} s:", last.t);
        for (i, e) in last.engines.iter().enumerate() {
            println!(
                "  ENG{} {:?}: N1 {:.2} %, N2 {:.2} %, FF {:.1} kg/h, EGT {:.1} °C, oil {:.1} psi, fuel used {:.1} kg",
                i + 1,
                e.state,
                e.n1,
                e.n2,
                e.fuel_flow,
                e.egt,
                e.oil_pressure,
                e.fuel_used
            );
        }
        let l = &last.limits;
        println!(
            "  Limits: idle {:.2}, CLB {:.2}, FLX {:.2}, MCT {:.2}, TOGA {:.2}",
            l.idle, l.climb, l.flex, l.maximum_continuous, l.toga
        );
    }
}
