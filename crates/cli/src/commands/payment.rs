//! Payment subcommands.

use clap::Subcommand;
use persimmon_client::{PaymentState, SyncEngine};
use persimmon_core::PaymentId;

/// Payment operations.
#[derive(Subcommand)]
pub enum PaymentAction {
    /// Poll a payment until it reaches a terminal state (Ctrl+C cancels)
    Watch {
        /// Payment identifier
        payment: String,
    },
}

/// How a watch ended.
enum WatchOutcome {
    Terminal(PaymentState),
    BoundReached,
    Canceled,
}

/// Execute a payment subcommand.
pub async fn run(engine: &SyncEngine, action: PaymentAction) {
    match action {
        PaymentAction::Watch { payment } => watch(engine, payment).await,
    }
}

/// Drive the poller to a terminal state, reporting the outcome.
#[allow(clippy::print_stdout)]
async fn watch(engine: &SyncEngine, payment: String) {
    let mut handle = engine.watch_payment(PaymentId::new(payment));
    println!("checking payment...");

    let outcome = loop {
        tokio::select! {
            changed = handle.changed() => match changed {
                Ok(state) if state.is_terminal() => break WatchOutcome::Terminal(state),
                Ok(PaymentState::Checking) => {}
                Ok(_) | Err(_) => break WatchOutcome::BoundReached,
            },
            _ = tokio::signal::ctrl_c() => break WatchOutcome::Canceled,
        }
    };

    match outcome {
        WatchOutcome::Terminal(PaymentState::Succeeded) => {
            println!("payment succeeded; cart cleared");
        }
        WatchOutcome::Terminal(_) => println!("payment failed or was canceled"),
        WatchOutcome::BoundReached => println!("stopped checking; payment still unresolved"),
        WatchOutcome::Canceled => {
            handle.stop();
            println!("canceled");
        }
    }
}
