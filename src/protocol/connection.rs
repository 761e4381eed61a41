use std::borrow::Cow;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use super::processor::Processor;

/// Closes every response
pub const END_MARKER: &str = "<END>";

const QUIT_COMMAND: &str = "QUIT";
const BYE_MSG: &str = "BYE";

// responses longer than this are shortened in the logs
const LOG_RESPONSE_LEN: usize = 100;

/// A client connection speaking the line protocol
///
/// every request is a single line, every response is zero or more lines
/// followed by the end marker.
pub struct Connection<S> {
    stream: BufReader<S>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    /// Serves requests until the client quits or closes the connection
    pub async fn serve(mut self, processor: &Processor) -> tokio::io::Result<()> {
        while let Some(line) = self.read_request().await? {
            let request = line.trim();
            tracing::debug!("received: {}", request);

            // an empty line still gets a (bare) end marker
            if request.is_empty() {
                self.send_response("").await?;
                continue;
            }

            if request.eq_ignore_ascii_case(QUIT_COMMAND) {
                self.send_response(BYE_MSG).await?;
                break;
            }

            let response = processor.process(request);
            tracing::debug!("responded: {}", summarize(&response));
            self.send_response(&response).await?;
        }

        Ok(())
    }

    /// Reads a single line from the connection
    ///
    /// bytes that aren't valid utf-8 are replaced rather than rejected.
    /// returns None once the client closes the connection.
    pub async fn read_request(&mut self) -> tokio::io::Result<Option<String>> {
        let mut line = Vec::new();
        let rcount = self.stream.read_until(b'\n', &mut line).await?;
        if rcount == 0 {
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }

    /// Writes a response followed by the end marker
    pub async fn send_response(&mut self, response: &str) -> tokio::io::Result<()> {
        let mut framed = String::with_capacity(response.len() + END_MARKER.len() + 2);
        if !response.is_empty() {
            framed.push_str(response);
            framed.push('\n');
        }
        framed.push_str(END_MARKER);
        framed.push('\n');

        self.stream.write_all(framed.as_bytes()).await?;
        self.stream.flush().await?;

        Ok(())
    }
}

fn summarize(response: &str) -> Cow<'_, str> {
    if response.is_empty() {
        return "[resposta vazia]".into();
    }

    if response.chars().count() <= LOG_RESPONSE_LEN {
        return response.into();
    }

    let shortened: String = response.chars().take(LOG_RESPONSE_LEN - 3).collect();
    (shortened + "...").into()
}

#[cfg(test)]
mod tests {
    use tokio::io::{
        AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, DuplexStream,
    };

    use super::{summarize, Connection, END_MARKER};
    use crate::protocol::processor::{Processor, SharedRegistry};

    // sends the whole session at once and returns everything the server wrote back
    async fn session(input: &str) -> String {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let processor = Processor::new(SharedRegistry::default());
        let server = tokio::spawn(async move { Connection::new(server).serve(&processor).await });

        let (mut reader, mut writer) = tokio::io::split(client);
        writer.write_all(input.as_bytes()).await.unwrap();
        writer.shutdown().await.unwrap();

        let mut output = String::new();
        reader.read_to_string(&mut output).await.unwrap();
        server.await.unwrap().unwrap();

        output
    }

    // a client connected to a server task that shares the given processor
    fn connect(processor: &Processor) -> BufReader<DuplexStream> {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let processor = processor.clone();
        tokio::spawn(async move { Connection::new(server).serve(&processor).await });

        BufReader::new(client)
    }

    // sends a single request and waits for the whole response
    async fn request(client: &mut BufReader<DuplexStream>, request: &str) -> String {
        client
            .write_all(format!("{}\n", request).as_bytes())
            .await
            .unwrap();

        let mut response = Vec::new();
        loop {
            let mut line = String::new();
            assert_ne!(client.read_line(&mut line).await.unwrap(), 0);

            let line = line.trim_end().to_string();
            if line == END_MARKER {
                return response.join("\n");
            }
            response.push(line);
        }
    }

    #[tokio::test]
    async fn responses_are_framed() {
        let output = session(
            "INSERT;TRIPULANTE;111;Ana;Rua A;5000.00;Piloto\n\
             GET;TRIPULANTE;111\n\
             \n\
             INSERT;AVIAO;737;2020;Boeing\r\n\
             ADD_TRIPULANTE;737;2020;Boeing;111\n\
             LIST;AVIAO\n",
        )
        .await;

        assert_eq!(
            output,
            "<END>\n\
             TRIPULANTE;111;Ana;Rua A;5000.0;Piloto\n<END>\n\
             <END>\n\
             <END>\n\
             Pessoa adicionado ao avião com sucesso\n<END>\n\
             01\n737;2020;Boeing;1;TRIPULANTE;111;Ana;Rua A;5000.0;Piloto\n<END>\n"
        );
    }

    #[tokio::test]
    async fn quit_closes_the_session() {
        let output = session("LIST;TRIPULANTE\nquit\nLIST;TRIPULANTE\n").await;
        assert_eq!(output, "0\n<END>\nBYE\n<END>\n");
    }

    #[tokio::test]
    async fn end_of_stream_closes_the_session() {
        // the last line has no newline, it's still a request
        let output = session("FOO;BAR").await;
        assert_eq!(output, "Operação não reconhecida: FOO\n<END>\n");

        assert_eq!(session("").await, "");
    }

    #[tokio::test]
    async fn connections_share_the_registry() {
        let processor = Processor::new(SharedRegistry::default());
        let mut first = connect(&processor);
        let mut second = connect(&processor);

        assert_eq!(
            request(&mut first, "INSERT;TRIPULANTE;111;Ana;Rua A;5000;Piloto").await,
            ""
        );
        assert_eq!(
            request(&mut second, "GET;TRIPULANTE;111").await,
            "TRIPULANTE;111;Ana;Rua A;5000.0;Piloto"
        );

        request(&mut second, "INSERT;AVIAO;737;2020;Boeing").await;
        request(&mut second, "ADD_TRIPULANTE;737;2020;Boeing;111").await;
        assert_eq!(
            request(&mut first, "LIST;AVIAO").await,
            "01\n737;2020;Boeing;1;TRIPULANTE;111;Ana;Rua A;5000.0;Piloto"
        );

        // one client leaving doesn't affect the other
        assert_eq!(request(&mut first, "QUIT").await, "BYE");
        request(&mut second, "UPDATE;TRIPULANTE;111;Ana;Rua B;5000;Piloto").await;
        assert_eq!(
            request(&mut second, "LIST_TRIPULANTES;737;2020;Boeing").await,
            "01\nTRIPULANTE;111;Ana;Rua B;5000.0;Piloto"
        );
    }

    #[test]
    fn check_summarize() {
        assert_eq!(summarize(""), "[resposta vazia]");
        assert_eq!(summarize("01\nA"), "01\nA");

        let long = "x".repeat(150);
        let short = summarize(&long);
        assert_eq!(short.len(), 100);
        assert!(short.ends_with("..."));
    }
}
