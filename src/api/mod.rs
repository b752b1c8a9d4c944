//! HTTP command API.
//!
//! Speaks the gobot robot API so that existing clients and peers keep
//! working:
//!
//! - `GET /api/robots/pilight` returns the robot status
//! - `GET /api/robots/pilight/commands` lists the commands
//! - `GET|POST /api/robots/pilight/commands/{command}` runs one, answering
//!   `{"result": "..."}`
//!
//! The request body, if any, is the command's parameter map. An empty,
//! malformed or non-object body counts as no parameters.

pub mod commands;
pub mod error;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::constants::*;

pub use commands::{CommandDefaults, CommandSurface, HalloweenRequest, LightOnRequest, Params};
pub use error::ApiError;

#[derive(Debug, Serialize)]
pub struct CommandResult {
    pub result: String,
}

#[derive(Debug, Serialize)]
pub struct CommandList {
    pub commands: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct RobotStatus {
    pub name: &'static str,
    pub commands: Vec<&'static str>,
    pub light: LightStatus,
    pub daylight: Option<DaylightStatus>,
    pub peer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LightStatus {
    pub on: bool,
    pub holds: usize,
}

#[derive(Debug, Serialize)]
pub struct DaylightStatus {
    pub model: String,
    pub date: Option<String>,
    pub utc_offset_hours: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

/// Build the router. Used by [`serve_on`] and by tests.
pub fn build_router(surface: Arc<CommandSurface>) -> Router {
    Router::new()
        .route("/api/robots/{robot}", get(robot_status))
        .route("/api/robots/{robot}/commands", get(list_commands))
        .route(
            "/api/robots/{robot}/commands/{command}",
            get(run_command).post(run_command),
        )
        .with_state(surface)
}

fn check_robot(robot: &str) -> Result<(), ApiError> {
    if robot == ROBOT_NAME {
        Ok(())
    } else {
        Err(ApiError::UnknownRobot(robot.to_string()))
    }
}

async fn robot_status(
    State(surface): State<Arc<CommandSurface>>,
    Path(robot): Path<String>,
) -> Result<Json<RobotStatus>, ApiError> {
    check_robot(&robot)?;
    Ok(Json(status(&surface)))
}

async fn list_commands(Path(robot): Path<String>) -> Result<Json<CommandList>, ApiError> {
    check_robot(&robot)?;
    Ok(Json(CommandList {
        commands: COMMANDS.to_vec(),
    }))
}

async fn run_command(
    State(surface): State<Arc<CommandSurface>>,
    Path((robot, command)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<CommandResult>, ApiError> {
    check_robot(&robot)?;
    let params = parse_params(&body);

    let result = match command.as_str() {
        COMMAND_LIGHT_ON => {
            log_block_start!("Command {command}");
            surface.light_on(&params)
        }
        COMMAND_HALLOWEEN => {
            log_block_start!("Command {command}");
            surface.halloween(&params).await
        }
        _ => return Err(ApiError::UnknownCommand(command)),
    };

    Ok(Json(CommandResult { result }))
}

/// Command parameters from a request body. Anything but a JSON object is
/// treated as no parameters.
pub fn parse_params(body: &[u8]) -> Params {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Params::new(),
    }
}

pub fn status(surface: &CommandSurface) -> RobotStatus {
    let scheduler = surface.scheduler();
    let snapshot = scheduler.coordinator().snapshot();

    let daylight = scheduler.window().map(|window| {
        let cached = window.cached();
        DaylightStatus {
            model: window.describe(),
            date: cached.map(|c| c.date.to_string()),
            utc_offset_hours: cached.map(|c| c.utc_offset_hours),
            sunrise: cached.map(|c| c.window.sunrise.format("%H:%M:%S").to_string()),
            sunset: cached.map(|c| c.window.sunset.format("%H:%M:%S").to_string()),
        }
    });

    RobotStatus {
        name: ROBOT_NAME,
        commands: COMMANDS.to_vec(),
        light: LightStatus {
            on: snapshot.light_on,
            holds: snapshot.holds,
        },
        daylight,
        peer: surface
            .forwarder()
            .target()
            .map(|t| format!("{}:{}", t.host, t.port)),
    }
}

/// Bind the API listener.
pub async fn bind(address: &str, port: u16) -> Result<TcpListener> {
    let addr = format!("{address}:{port}");
    TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind command API on {addr}"))
}

/// Serve the API on `listener` until `shutdown` resolves.
///
/// In-flight commands (a running strobe, say) are allowed to finish.
pub async fn serve_on<F>(
    listener: TcpListener,
    surface: Arc<CommandSurface>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        log_decorated!("Command API listening on http://{addr}");
    }

    axum::serve(listener, build_router(surface))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Command API server failed")
}
