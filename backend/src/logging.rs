use std::fmt::Write as _;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, EnvFilter, Layer, Registry};

/// Wheel and lead traffic at info, request traces only when something fails.
const DEFAULT_FILTER: &str = "warn,spin_backend=info,spin_shared=info,tower_http=warn";

/// Collects the event message plus any structured fields such as
/// `player_id` or `email`.
#[derive(Default)]
struct SpinEventVisitor {
    message: String,
    fields: String,
}

impl Visit for SpinEventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }
}

/// Short label for where an event came from.
fn channel(target: &str) -> &str {
    if target.starts_with("spin_backend::games") || target.starts_with("spin_shared") {
        "🎡 wheel"
    } else if target.starts_with("spin_backend::services::lead_service") || target.starts_with("spin_backend::handlers") {
        "📨 lead"
    } else if target.starts_with("tower_http") {
        "🌐 http"
    } else {
        target
    }
}

fn render(level: &Level, target: &str, visitor: &SpinEventVisitor) -> String {
    let marker = match *level {
        Level::ERROR => "❌",
        Level::WARN => "⚠️",
        Level::INFO => "ℹ️",
        _ => "🔄",
    };
    format!("{} {}: {}{}", marker, channel(target), visitor.message, visitor.fields)
}

struct SpinLogLayer;

impl<S: Subscriber> Layer<S> for SpinLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = SpinEventVisitor::default();
        event.record(&mut visitor);
        if visitor.message.is_empty() {
            return;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let line = render(metadata.level(), metadata.target(), &visitor);
        match *metadata.level() {
            Level::ERROR | Level::WARN => eprintln!("[{}] {}", timestamp, line),
            Level::TRACE => {}
            _ => println!("[{}] {}", timestamp, line),
        }
    }
}

/// Installs the global subscriber. `log` records from the shared crate are
/// bridged into it. Calling twice is harmless.
pub fn setup() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = Registry::default().with(env_filter).with(SpinLogLayer);

    if subscriber.try_init().is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_by_target() {
        assert_eq!(channel("spin_backend::games::spin_timer"), "🎡 wheel");
        assert_eq!(channel("spin_shared::shared_wheel_game"), "🎡 wheel");
        assert_eq!(channel("spin_backend::services::lead_service"), "📨 lead");
        assert_eq!(channel("tower_http::trace::on_response"), "🌐 http");
        assert_eq!(channel("spin_backend"), "spin_backend");
    }

    #[test]
    fn test_render_appends_fields() {
        let visitor = SpinEventVisitor {
            message: "landed on a prize".to_string(),
            fields: " player_id=p1 slice=4".to_string(),
        };
        assert_eq!(
            render(&Level::INFO, "spin_backend::games::spin_timer", &visitor),
            "ℹ️ 🎡 wheel: landed on a prize player_id=p1 slice=4"
        );
    }
}
