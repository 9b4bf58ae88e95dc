use crate::render::{self, print_increment, print_stdout};
use crate::session::Session;
use anyhow::Result;
use docrag_search::{corpus_overview, corpus_stats, list_documents, Answer};
use tokio::io::{AsyncBufReadExt, BufReader};

/// One line typed at the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Exit,
    Stats,
    Help,
    Docs,
    Topics,
    Empty,
    Question(String),
}

impl ChatCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "" => Self::Empty,
            "salir" | "exit" | "quit" | "q" => Self::Exit,
            "stats" => Self::Stats,
            "ayuda" | "help" | "?" => Self::Help,
            "docs" | "documentos" => Self::Docs,
            "temas" | "topics" => Self::Topics,
            _ => Self::Question(line.to_string()),
        }
    }
}

pub async fn stats(session: &Session) -> Result<String> {
    let stats = corpus_stats(
        session.fragment_store(),
        session.config.retrieval.scan_batch_size,
    )
    .await?;
    Ok(render::stats_text(&stats))
}

pub async fn docs(session: &Session) -> Result<String> {
    let documents = list_documents(
        session.fragment_store(),
        session.config.retrieval.scan_batch_size,
    )
    .await?;
    Ok(render::documents_text(&documents))
}

pub async fn topics(session: &Session) -> Result<String> {
    let vocabulary = session.config.vocabulary();
    let topics = corpus_overview(
        session.fragment_store(),
        &vocabulary,
        session.config.retrieval.scan_batch_size,
    )
    .await?;
    Ok(render::topics_text(&topics))
}

/// Answer one question on stdout, streaming the response as it arrives
pub async fn answer(session: &Session, question: &str) -> Result<()> {
    match session.assistant.ask(question).await? {
        Answer::NoInformation { .. } => print_stdout(&format!("\n{}", render::NO_INFORMATION)),
        Answer::OutOfScope { .. } => print_stdout(&format!("\n{}", render::OUT_OF_SCOPE)),
        Answer::Grounded(mut grounded) => {
            print_stdout(&format!(
                "\nContext ready: {} relevant fragments\n",
                grounded.fragments.len()
            ))?;
            while let Some(increment) = grounded.stream.next().await {
                print_increment(&increment?)?;
            }
            print_stdout("")?;
            print_stdout(&render::sources_text(&grounded.sources))
        }
    }
}

/// Read-eval loop over stdin until an exit command or end of input
pub async fn run(session: &Session) -> Result<()> {
    print_stdout(&render::banner(&format!(
        "DOCUMENT ASSISTANT - {}",
        session.assistant.generator().model_id()
    )))?;
    print_stdout(render::WELCOME)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_stdout(&format!("\n{}", render::rule()))?;
        print_increment("Your question: ")?;

        let Some(line) = lines.next_line().await? else {
            print_stdout(&format!("\n{}", render::FAREWELL))?;
            return Ok(());
        };

        let output = match ChatCommand::parse(&line) {
            ChatCommand::Exit => {
                print_stdout(&format!("\n{}", render::FAREWELL))?;
                return Ok(());
            }
            ChatCommand::Empty => continue,
            ChatCommand::Help => render::WELCOME.to_string(),
            ChatCommand::Stats => stats(session).await?,
            ChatCommand::Docs => docs(session).await?,
            ChatCommand::Topics => topics(session).await?,
            ChatCommand::Question(question) => {
                // A failed question is reported and the session continues.
                if let Err(e) = answer(session, &question).await {
                    log::error!("Failed to answer: {e:#}");
                }
                continue;
            }
        };
        print_stdout(&format!("\n{output}"))?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(ChatCommand::parse("  SALIR "), ChatCommand::Exit);
        assert_eq!(ChatCommand::parse("q"), ChatCommand::Exit);
        assert_eq!(ChatCommand::parse("Ayuda"), ChatCommand::Help);
        assert_eq!(ChatCommand::parse("?"), ChatCommand::Help);
        assert_eq!(ChatCommand::parse("documentos"), ChatCommand::Docs);
        assert_eq!(ChatCommand::parse("temas"), ChatCommand::Topics);
        assert_eq!(ChatCommand::parse("Stats"), ChatCommand::Stats);
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(ChatCommand::parse("   "), ChatCommand::Empty);
    }

    #[test]
    fn anything_else_is_a_question() {
        assert_eq!(
            ChatCommand::parse(" What is positional encoding? "),
            ChatCommand::Question("What is positional encoding?".to_string())
        );
    }
}
