//! Chat command adapter
//!
//! Transport-free core of the maintenance chat assistant. A frontend
//! (Telegram, Slack, a REPL) parses user text into a [`ChatCommand`] and
//! renders replies from domain types; nothing here does I/O.
//!
//! Spanish aliases (`/simular`, `/estado`) are kept for operators of the
//! original deployment.

use crate::error::CoreError;
use crate::pipeline::ServiceStatus;
use crate::session::MonitoringSession;
use crate::types::{HealthSnapshot, ScenarioKind};

// ============================================================================
// Commands
// ============================================================================

/// One parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Start,
    Help,
    Simulate { scenario: Option<ScenarioKind> },
    Status,
}

/// Parse a chat message into a command.
///
/// Accepts `/start`, `/help`, `/simulate [scenario]`, `/status` plus the
/// Spanish aliases. A trailing `@botname` mention is stripped, as chat
/// platforms append it in group conversations.
pub fn parse(input: &str) -> Result<ChatCommand, CoreError> {
    let mut parts = input.trim().split_whitespace();
    let command = parts
        .next()
        .ok_or_else(|| CoreError::InvalidInput("empty message".to_string()))?;
    let command = command.split('@').next().unwrap_or(command);

    match command.to_lowercase().as_str() {
        "/start" => Ok(ChatCommand::Start),
        "/help" | "/ayuda" => Ok(ChatCommand::Help),
        "/simulate" | "/simular" => {
            let scenario = match parts.next() {
                Some(arg) => Some(
                    ScenarioKind::from_str(arg)
                        .ok_or_else(|| CoreError::UnknownScenario(arg.to_string()))?,
                ),
                None => None,
            };
            Ok(ChatCommand::Simulate { scenario })
        }
        "/status" | "/estado" => Ok(ChatCommand::Status),
        other => Err(CoreError::InvalidInput(format!(
            "unrecognized command '{other}'"
        ))),
    }
}

// ============================================================================
// Reply Renderers
// ============================================================================

/// Reply to `/start`.
pub fn render_greeting() -> String {
    concat!(
        "🤖 Predictive Maintenance Bot\n",
        "\n",
        "Hi! I watch equipment telemetry and project remaining life.\n",
        "\n",
        "📋 Available commands:\n",
        "/start - Show this message\n",
        "/simulate [scenario] - Run a degradation simulation\n",
        "/status - Service status\n",
        "/help - Help\n",
    )
    .to_string()
}

/// Reply to `/help`.
pub fn render_help() -> String {
    let mut text = String::from(
        "🆘 Help - available commands\n\n\
         /simulate [scenario] - Run a degradation simulation\n\
         /status - Show service status\n\
         /help - Show this help\n\n\
         Scenarios:\n",
    );
    for kind in ScenarioKind::ALL {
        text.push_str(&format!("• {} - {}\n", kind, kind.display_name()));
    }
    text.push_str("\nExample: /simulate overheat");
    text
}

/// Reply carrying one simulation result.
pub fn render_snapshot(snapshot: &HealthSnapshot) -> String {
    format!(
        "✅ Simulation complete\n\n\
         📊 Results for {}:\n\
         • Scenario: {}\n\
         • Condition: {}\n\
         • Remaining life: {:.1}%\n\
         • Recommendation: {}",
        snapshot.equipment_id,
        snapshot.scenario.display_name(),
        snapshot.condition,
        snapshot.remaining_life_pct,
        snapshot.recommendation,
    )
}

/// Reply to `/status`.
pub fn render_status(status: ServiceStatus, session: &MonitoringSession) -> String {
    let engine = session.engine();
    let active = engine.active_rule_ids();
    let alerts_line = if active.is_empty() {
        "none".to_string()
    } else {
        active.join(", ")
    };

    format!(
        "📈 Service status\n\n\
         • Status: {}\n\
         • Equipment: {}\n\
         • Rules loaded: {}\n\
         • Active alerts: {}\n\
         • Cycles completed: {}\n\
         • Alerts emitted: {}",
        status,
        session.equipment_id(),
        engine.rules().len(),
        alerts_line,
        session.cycles_completed(),
        engine.alerts_emitted(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(parse("/start").unwrap(), ChatCommand::Start);
        assert_eq!(parse("/help").unwrap(), ChatCommand::Help);
        assert_eq!(parse("/status").unwrap(), ChatCommand::Status);
        assert_eq!(
            parse("/simulate").unwrap(),
            ChatCommand::Simulate { scenario: None }
        );
    }

    #[test]
    fn test_parse_spanish_aliases() {
        assert_eq!(parse("/estado").unwrap(), ChatCommand::Status);
        assert_eq!(
            parse("/simular overheat").unwrap(),
            ChatCommand::Simulate {
                scenario: Some(ScenarioKind::Overheat)
            }
        );
    }

    #[test]
    fn test_parse_simulate_with_scenario() {
        assert_eq!(
            parse("/simulate pressure_loss").unwrap(),
            ChatCommand::Simulate {
                scenario: Some(ScenarioKind::PressureLoss)
            }
        );
        // Aliases accepted by the scenario parser work here too
        assert_eq!(
            parse("/simulate vibration").unwrap(),
            ChatCommand::Simulate {
                scenario: Some(ScenarioKind::ExcessVibration)
            }
        );
    }

    #[test]
    fn test_parse_unknown_scenario_argument() {
        let err = parse("/simulate meltdown").unwrap_err();
        assert!(matches!(err, CoreError::UnknownScenario(_)));
    }

    #[test]
    fn test_parse_unknown_command() {
        let err = parse("/selfdestruct").unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));

        let err = parse("   ").unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_strips_bot_mention() {
        assert_eq!(parse("/status@vigia_bot").unwrap(), ChatCommand::Status);
    }

    #[test]
    fn test_render_help_lists_scenarios() {
        let help = render_help();
        for kind in ScenarioKind::ALL {
            assert!(help.contains(&kind.to_string()));
        }
    }

    #[test]
    fn test_render_snapshot_includes_recommendation() {
        use crate::simulator::DegradationSimulator;

        let simulator = DegradationSimulator::new();
        let snapshot = simulator
            .simulate(ScenarioKind::Overheat, "motor_principal", 100.0)
            .unwrap();

        let reply = render_snapshot(&snapshot);
        assert!(reply.contains("motor_principal"));
        assert!(reply.contains("Condition"));
        assert!(reply.contains(&snapshot.recommendation));
    }

    #[test]
    fn test_render_status_reports_counts() {
        let session = MonitoringSession::default();
        let reply = render_status(ServiceStatus::Monitoring, &session);

        assert!(reply.contains("Monitoring"));
        assert!(reply.contains("motor_principal"));
        assert!(reply.contains("Active alerts: none"));
    }
}
