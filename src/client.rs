//: A console client for the aviation server.
//: every line typed on stdin is sent as a request, and the response lines
//: are printed until the end marker. closing stdin ends the session with QUIT.
//: the block headers of the complete report (LIST;ALL) are shown as titles.

use anyhow::Context;
use clap::Parser;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::TcpStream,
};
use tracing_subscriber::EnvFilter;

const END_MARKER: &str = "<END>";
const QUIT_COMMAND: &str = "QUIT";

#[derive(Parser, Debug)]
#[command(name = "aviation-client")]
struct Args {
    /// Address of the aviation server
    #[arg(short, long, env = "AVIATION_ADDR", default_value = "127.0.0.1:8080")]
    addr: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut stream = TcpStream::connect(&args.addr)
        .await
        .with_context(|| format!("failed to connect to {}", args.addr))?;
    tracing::info!("connected to: {}", args.addr);

    let (reader, mut writer) = stream.split();
    let mut server = BufReader::new(reader).lines();
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        // end of input is the same as asking to quit
        let request = input
            .next_line()
            .await?
            .unwrap_or_else(|| QUIT_COMMAND.to_string());

        writer.write_all(format!("{}\n", request).as_bytes()).await?;
        tracing::debug!("sent: {}", request);

        for line in read_response(&mut server).await? {
            println!("{}", render(&line));
        }

        if request.trim().eq_ignore_ascii_case(QUIT_COMMAND) {
            break;
        }
    }

    tracing::info!("connection closed");

    Ok(())
}

// reads the lines of a single response, up to (and excluding) the end marker
async fn read_response<R>(server: &mut Lines<R>) -> anyhow::Result<Vec<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = Vec::new();
    loop {
        let line = server
            .next_line()
            .await?
            .context("the server closed the connection")?;

        if line == END_MARKER {
            return Ok(lines);
        }

        lines.push(line);
    }
}

// turns the report headers into titles, every other line is shown as is
fn render(line: &str) -> String {
    let Some((tag, value)) = line.split_once(';') else {
        return line.to_string();
    };

    match tag {
        "ESTATISTICAS" => format!("Estatísticas: {}", value),
        "TRIPULANTES" => format!("\n== Tripulantes ({}) ==", value),
        "PASSAGEIROS" => format!("\n== Passageiros ({}) ==", value),
        "AVIOES" => format!("\n== Aviões ({}) ==", value),
        _ => line.to_string(),
    }
}
