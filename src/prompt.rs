use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};

/// Reads one trimmed line from stdin. Blocks without a timeout; the workflow
/// never proceeds past a prompt on its own.
pub async fn read_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    BufReader::new(stdin()).read_line(&mut line).await?;
    Ok(line.trim().to_string())
}

/// ENTER or an affirmative answer proceeds; `n`/`no` cancels the run instead
/// of forcing the operator to kill the process.
pub async fn confirm(prompt: &str) -> io::Result<bool> {
    let answer = read_line(prompt).await?;
    Ok(!matches!(answer.to_lowercase().as_str(), "n" | "no"))
}
