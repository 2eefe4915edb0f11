use clap::Parser;
use stalk_client::config::get_configuration;
use stalk_client::models::MessageKind;
use stalk_client::Application;
use stalk_core::observability::init_tracing;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Join a consultation's live session from the terminal.
#[derive(Parser, Debug)]
#[command(name = "stalk-session", version)]
struct Args {
    /// Consultation to join.
    #[arg(long)]
    consultation: u64,

    /// Stock code to keep a live quote for (shown with `/quote`).
    #[arg(long)]
    stock: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        &configuration.application.name,
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    )?;

    let app = Application::build(configuration).await?;
    if !app.auth().is_authenticated().await {
        anyhow::bail!("No access token configured; set APP_APPLICATION__ACCESS_TOKEN");
    }

    let consultations = app.consultations();
    let mut consultation = consultations.client().get(args.consultation).await?;
    println!(
        "Consultation #{} with {} on {} {}",
        consultation.id,
        consultation.counterparty_name,
        consultation.scheduled_date,
        consultation.scheduled_time.format("%H:%M")
    );

    let watcher = args
        .stock
        .as_deref()
        .map(|code| app.watch_stock(code))
        .transpose()?;

    let session = app.session().await?;
    if let Err(e) = session.connect(&consultation).await {
        println!("{}", e.user_facing());
        app.shutdown().await;
        return Ok(());
    }

    let chat = session.chat();
    let mut appended = chat.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(message) = appended.recv().await {
            match message.kind {
                MessageKind::System => println!("* {}", message.text),
                MessageKind::User => println!(
                    "[{}] {}: {}",
                    message.timestamp.format("%H:%M"),
                    message.sender,
                    message.text
                ),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = session.closed() => break,
            line = lines.next_line() => match line? {
                None => break,
                Some(line) if line.trim() == "/leave" => break,
                Some(line) if line.trim() == "/quote" => match watcher.as_ref().and_then(|w| w.latest()) {
                    Some(quote) => println!(
                        "{} {} {:.2} {} ({:+.2}%)",
                        quote.code,
                        quote.name,
                        quote.price,
                        if quote.is_rising() { "▲" } else { "▼" },
                        quote.change_rate
                    ),
                    None => println!("No quote available"),
                },
                Some(line) => {
                    if let Err(e) = chat.send(&line).await {
                        println!("{}", e.user_facing());
                    }
                }
            },
        }
    }

    session.disconnect().await;
    printer.abort();

    if let Some(reason) = session.ended_reason().await {
        println!("Session ended: {}", reason);
        match consultations.confirm_completion(&mut consultation).await {
            Ok(true) => println!("Consultation marked as completed"),
            Ok(false) => {}
            Err(e) => println!("{}", e.user_facing()),
        }
    }

    if let Some(watcher) = watcher {
        watcher.stop().await;
    }
    app.shutdown().await;
    Ok(())
}
