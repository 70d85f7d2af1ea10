//! Main drive executable entry point.
//! 
//! # Architecture
//! 
//! The general execution methodology consists of:
//! 
//!     - Initialise the session, logging and DriveCtrl
//!     - Main loop, one iteration per telemetry sample:
//!         - Telemetry acquisition (simulator messages or CSV replay)
//!         - Drive control processing
//!         - Command output and archiving
//! 
//! # Usage
//! 
//!     drive_exec [REPLAY_CSV] [SPEED_POLICY]
//! 
//! With no arguments simulator messages are read from stdin and replies are
//! written to stdout. Use `-` as the replay path to select the simulator with
//! an explicit speed policy.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::{WrapErr, eyre}};
use log::{debug, info, warn};
use serde::Serialize;
use std::env;
use std::io;

// Internal
use drive_lib::{
    drive_ctrl::{DriveCmd, DriveCtrl, SpeedPolicy, StatusReport, Telemetry},
    sim_client::{SimClient, SimMessage, TelemReplay}
};
use util::{
    archive::Archiver,
    host,
    logger::{logger_init, LevelFilter},
    session::Session
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Parameter file for DriveCtrl, relative to the params directory
const DRIVE_CTRL_PARAMS: &str = "drive_ctrl.toml";

/// Per-cycle control traces stay at debug, the cycle archive holds the detail
const CONTROL_LOG_LEVELS: &[(&str, LevelFilter)] = &[
    ("drive_lib::drive_ctrl", LevelFilter::Debug),
];

/// Archive of every accepted cycle, relative to the session archive root
const CYCLE_ARCHIVE: &str = "drive_ctrl/cycles.csv";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Source of telemetry for this run.
enum TelemSource {
    Sim,
    Replay(String)
}

/// One row of the cycle archive.
#[derive(Serialize)]
struct CycleRecord {
    cte: f64,
    steering_angle: f64,
    speed: f64,
    steer: f64,
    target_speed: f64,
    throttle: f64
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "drive_exec", 
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, CONTROL_LOG_LEVELS, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Drive Controller Executable\n");
    info!("Running on: {}", host::get_host_info());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- PARSE ARGUMENTS ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    if args.len() > 3 {
        return Err(eyre!(
            "Expected at most two arguments, found {}", args.len() - 1)
        );
    }

    let source = match args.get(1).map(|s| s.as_str()) {
        None | Some("-") => TelemSource::Sim,
        Some(path) => TelemSource::Replay(path.to_string())
    };

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut drive_ctrl = DriveCtrl::from_params_file(DRIVE_CTRL_PARAMS)
        .wrap_err("Failed to initialise DriveCtrl")?;

    let policy = match args.get(2) {
        Some(p) => p.parse::<SpeedPolicy>().wrap_err("Invalid speed policy argument")?,
        None => drive_ctrl.params().speed_policy
    };

    info!("DriveCtrl init complete, speed policy: {:?}", policy);

    let mut archiver = Archiver::from_path(&session, CYCLE_ARCHIVE)
        .wrap_err("Failed to create the cycle archive")?;

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    let num_cycles = match source {
        TelemSource::Replay(path) => {
            info!("Replaying telemetry from \"{}\"", path);

            let replay = TelemReplay::from_path(&path)
                .wrap_err("Failed to open the telemetry replay")?;

            run_replay(replay, &mut drive_ctrl, policy, &mut archiver)?
        },
        TelemSource::Sim => {
            info!("Serving simulator messages on stdin/stdout");

            let stdin = io::stdin();
            let stdout = io::stdout();
            let client = SimClient::new(stdin.lock(), stdout.lock());

            run_sim(client, &mut drive_ctrl, policy, &mut archiver)?
        }
    };

    info!("End of telemetry after {} cycles", num_cycles);

    Ok(())
}

/// Run the controller over every sample of a replay, returning the number of
/// cycles processed.
fn run_replay<R: io::Read>(
    replay: TelemReplay<R>,
    drive_ctrl: &mut DriveCtrl,
    policy: SpeedPolicy,
    archiver: &mut Archiver
) -> Result<u64, Report> {
    let mut num_cycles = 0;

    for telem in replay {
        let telem = telem.wrap_err("Failed to read telemetry")?;
        num_cycles += 1;

        if let Some((cmd, report)) = proc_cycle(drive_ctrl, &telem, policy) {
            archive_cycle(archiver, &telem, &cmd, &report);
        }
    }

    Ok(num_cycles)
}

/// Serve simulator messages until the input closes, returning the number of
/// cycles processed.
fn run_sim<R: io::BufRead, W: io::Write>(
    mut client: SimClient<R, W>,
    drive_ctrl: &mut DriveCtrl,
    policy: SpeedPolicy,
    archiver: &mut Archiver
) -> Result<u64, Report> {
    let mut num_cycles = 0;
    let mut last_cmd: Option<DriveCmd> = None;

    loop {
        let msg = match client.recv() {
            Ok(Some(m)) => m,
            Ok(None) => break,
            Err(e) => {
                warn!("Could not parse simulator message: {}", e);
                client.send_manual().wrap_err("Failed to send to the simulator")?;
                continue
            }
        };

        match msg {
            SimMessage::Telemetry(telem) => {
                num_cycles += 1;

                if let Some((cmd, report)) = proc_cycle(drive_ctrl, &telem, policy) {
                    archive_cycle(archiver, &telem, &cmd, &report);
                    last_cmd = Some(cmd);
                }

                // A rejected cycle holds the previous command
                let sent = match last_cmd {
                    Some(ref cmd) => client.send_cmd(cmd),
                    None => client.send_manual()
                };
                sent.wrap_err("Failed to send to the simulator")?;
            },
            SimMessage::NoData => {
                client.send_manual().wrap_err("Failed to send to the simulator")?;
            },
            SimMessage::Other(event) => debug!("Ignoring \"{}\" event", event)
        }
    }

    Ok(num_cycles)
}

/// Run one DriveCtrl cycle, logging rejected cycles.
fn proc_cycle(
    drive_ctrl: &mut DriveCtrl,
    telem: &Telemetry,
    policy: SpeedPolicy
) -> Option<(DriveCmd, StatusReport)> {
    match drive_ctrl.proc_cycle(telem, policy) {
        Ok(r) => Some(r),
        Err(e) => {
            warn!("DriveCtrl rejected cycle: {}", e);
            None
        }
    }
}

fn archive_cycle(
    archiver: &mut Archiver,
    telem: &Telemetry,
    cmd: &DriveCmd,
    report: &StatusReport
) {
    let record = CycleRecord {
        cte: telem.cte,
        steering_angle: telem.steering_angle,
        speed: telem.speed,
        steer: cmd.steer,
        target_speed: report.target_speed,
        throttle: cmd.throttle
    };

    if let Err(e) = archiver.serialise(record) {
        warn!("Could not archive cycle: {}", e);
    }
}
