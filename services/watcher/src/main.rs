use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod console;

use session::{
    ExpirationNotifier, HttpStatusSource, MonitorPhase, NoticeEffect, NoticeEvent, SessionMonitor,
};

use crate::{
    config::WatcherConfig,
    console::{Command, render},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = WatcherConfig::from_env()?;
    info!("Watching session at {}", config.status_url);

    let source = HttpStatusSource::new(config.status_url.clone(), config.token.clone());
    let mut monitor = SessionMonitor::new(source, config.monitor.clone());
    let mut reports = monitor.report_stream();
    let mut notifier = ExpirationNotifier::new();

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    monitor.enter_protected();

    loop {
        let effect = tokio::select! {
            report = reports.recv() => {
                let Some(report) = report else {
                    break;
                };
                if report.phase == MonitorPhase::Idle && report.polls > 0 {
                    println!("Your session has ended. Sign in again at {}", config.login_url);
                    break;
                }
                notifier.apply(NoticeEvent::Status(report.update))
            }
            line = stdin.next_line(), if stdin_open => {
                match line? {
                    Some(line) => match Command::parse(&line) {
                        Some(Command::Continue) => notifier.apply(NoticeEvent::Continue),
                        Some(Command::Login) => notifier.apply(NoticeEvent::GoToLogin),
                        None => {
                            warn!("Unknown command {:?}, expected 'continue' or 'login'", line.trim());
                            NoticeEffect::None
                        }
                    },
                    None => {
                        stdin_open = false;
                        NoticeEffect::None
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Interrupted");
                break;
            }
        };

        if let Some(text) = render(effect, &notifier, &config.login_url) {
            println!("{}", text);
        }
        if effect == NoticeEffect::NavigateToLogin {
            break;
        }
    }

    monitor.leave_protected();
    info!("Session watcher stopped");

    Ok(())
}
