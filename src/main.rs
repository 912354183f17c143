use anyhow::{Context, Result};
use std::io::Write as _;
use std::path::Path;
use swasthya::ai::{
    AIError, ChatSession, HealthAI, MediaFile, SessionMode, encode_base64, mime_type_for_path,
};
use swasthya::content::{FAQS, SDG_GOALS};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Bundled defaults, used when no .env file is present
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

fn load_dotenv() {
    // First try to load from .env file (local dev)
    if dotenvy::dotenv().is_ok() {
        return;
    }

    load_bundled_config();
}

fn load_bundled_config() {
    for line in BUNDLED_CONFIG.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim();
            // Only set if not already set (allow env override)
            if std::env::var(key).is_err() {
                // SAFETY: We're setting env vars at startup before the runtime spawns any threads
                unsafe {
                    std::env::set_var(key, value);
                }
            }
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

const HELP: &str = "\
Type a question to chat. Commands:
  /mode <standard|fast|thinking|maps|search>  start a new conversation in that mode
  /faq                                        suggested questions
  /sdg                                        goals this project supports
  /speak <text>                               read text aloud
  /analyze <file> <prompt>                    ask about an image, recording or PDF
  /transcribe <file>                          transcribe an audio file
  /edit <image> <out.png> <prompt>            edit an image
  /quit";

fn main() -> Result<()> {
    load_dotenv();
    init_tracing();

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(run())
}

async fn run() -> Result<()> {
    let ai = HealthAI::global()?;
    let mut session = ai.create_session(SessionMode::default());
    println!("Health awareness assistant ({} mode). /help for commands.", session.mode());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = match line.strip_prefix('/') {
            Some(cmd) => cmd.split_once(' ').unwrap_or((cmd, "")),
            None => {
                chat(&mut session, line).await;
                continue;
            }
        };
        let rest = rest.trim();

        match command {
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "mode" => match rest.parse::<SessionMode>() {
                Ok(mode) => {
                    session = ai.create_session(mode);
                    println!("New conversation in {mode} mode.");
                }
                Err(err) => println!("{err}"),
            },
            "faq" => {
                for faq in FAQS {
                    println!("- {}", faq.question);
                }
            }
            "sdg" => {
                for goal in SDG_GOALS {
                    println!("{} {}\n  {}", goal.icon, goal.title, goal.description);
                }
            }
            "speak" => ai.synthesize_speech(rest).await,
            "analyze" => {
                let Some((path, prompt)) = rest.split_once(' ') else {
                    println!("usage: /analyze <file> <prompt>");
                    continue;
                };
                match read_media(path) {
                    Ok(file) => report(ai.analyze_media(&file, prompt.trim()).await),
                    Err(err) => println!("{err:#}"),
                }
            }
            "transcribe" => match read_media(rest) {
                Ok(file) => report(ai.transcribe_audio(&file).await),
                Err(err) => println!("{err:#}"),
            },
            "edit" => {
                let mut parts = rest.splitn(3, ' ');
                let (Some(input), Some(output), Some(prompt)) =
                    (parts.next(), parts.next(), parts.next())
                else {
                    println!("usage: /edit <image> <out.png> <prompt>");
                    continue;
                };
                if let Err(err) = edit(ai, input, output, prompt).await {
                    println!("{err:#}");
                }
            }
            other => println!("unknown command /{other}; /help lists commands"),
        }
    }

    Ok(())
}

async fn chat(session: &mut ChatSession<'_>, text: &str) {
    let result = session
        .send_message_stream(text, |piece| {
            print!("{piece}");
            let _ = std::io::stdout().flush();
        })
        .await;
    println!();

    match result {
        Ok(reply) => {
            for source in &reply.sources {
                println!("  source: {} {}", source.title.as_deref().unwrap_or(""), source.uri);
            }
        }
        Err(err) => print_error(&err),
    }
}

async fn edit(ai: &HealthAI, input: &str, output: &str, prompt: &str) -> Result<()> {
    let file = read_media(input)?;
    let data_uri = match ai
        .edit_image(&encode_base64(&file.bytes), &file.mime_type, prompt)
        .await
    {
        Ok(uri) => uri,
        Err(err) => {
            print_error(&err.into_classified());
            return Ok(());
        }
    };

    let encoded = data_uri
        .split_once(',')
        .map(|(_, data)| data)
        .context("edited image is not a data URI")?;
    let bytes = base64_decode(encoded)?;
    std::fs::write(output, bytes).with_context(|| format!("failed to write {output}"))?;
    println!("Saved edited image to {output}");
    Ok(())
}

fn base64_decode(data: &str) -> Result<Vec<u8>> {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .context("edited image is not valid base64")
}

fn read_media(path: &str) -> Result<MediaFile> {
    let path = Path::new(path);
    let mime_type = mime_type_for_path(path)
        .with_context(|| format!("unsupported file type: {}", path.display()))?;
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(MediaFile::new(bytes, mime_type))
}

fn report(result: std::result::Result<String, AIError>) {
    match result {
        Ok(text) => println!("{text}"),
        Err(err) => print_error(&err),
    }
}

fn print_error(err: &AIError) {
    if err.is_retryable {
        println!("[{}] {} You can try again.", err.kind, err.message);
    } else {
        println!("[{}] {}", err.kind, err.message);
    }
}
