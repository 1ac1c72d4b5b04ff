use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use monkey::{
    environment::Environment,
    evaluator::{Evaluator, StdioContext},
    lexer::{
        formatter::{BasicFormatter, DebugFormatter, LineFormatter, ToFormatter, TokenFormatter},
        Lexer,
    },
    object::{
        formatter::{
            BasicFormatter as BasicValueFormatter, DebugFormatter as DebugValueFormatter,
            ValueFormatter,
        },
        Object,
    },
    parser::{
        formatter::{
            BasicParserFormatter, DebugParserFormatter, ParserFormatter, PrettyParserFormatter,
        },
        Parser as MonkeyParser,
    },
    token::TokenKind,
};
use std::{
    fs::read_to_string,
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
};

const PARSE_FAILURE: u8 = 65;
const RUNTIME_FAILURE: u8 = 70;
const PROMPT: &str = ">> ";

#[derive(Debug, Parser)]
#[clap(name = "monkey", version)]
pub struct CLArgs {
    /// Starts the REPL when omitted.
    #[clap(subcommand)]
    pub routine: Option<MonkeyCommand>,
}

#[derive(Debug, Subcommand)]
pub enum MonkeyCommand {
    /// Dumps the token stream of a file.
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    /// Prints the canonical rendering of each statement in a file.
    Parse {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: ProgramFormat,
    },
    /// Evaluates a file and prints its result.
    Run {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: RunFormat,
    },
    Repl,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
    Line,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ProgramFormat {
    Debug,
    Basic,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum RunFormat {
    Debug,
    Basic,
    Pretty,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    init_tracing()?;

    let args = CLArgs::parse();
    match args.routine {
        Some(MonkeyCommand::Tokenize { path, format }) => {
            tracing::debug!(?path, "tokenizing");
            let src = read_to_string(path)?;
            Ok(tokenize(&src, &format))
        }
        Some(MonkeyCommand::Parse { path, format }) => {
            tracing::debug!(?path, "parsing");
            let src = read_to_string(path)?;
            Ok(parse(&src, &format))
        }
        Some(MonkeyCommand::Run { path, format }) => {
            tracing::debug!(?path, "running");
            let src = read_to_string(&path)?;
            Ok(run(&path.to_string_lossy(), &src, &format))
        }
        Some(MonkeyCommand::Repl) | None => {
            repl()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing() -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .try_init()?;
    }
    Ok(())
}

fn tokenize(src: &str, format: &TokenFormat) -> ExitCode {
    let mut lexer = Lexer::new(src);
    let formatter: Box<dyn TokenFormatter> = match format {
        TokenFormat::Debug => Box::new(ToFormatter::<DebugFormatter>::create_formatter(&lexer)),
        TokenFormat::Basic => Box::new(ToFormatter::<BasicFormatter>::create_formatter(&lexer)),
        TokenFormat::Line => Box::new(ToFormatter::<LineFormatter>::create_formatter(&lexer)),
    };

    let mut succeeded = true;
    loop {
        let token = lexer.next_token();
        println!("{}", formatter.format(&token));
        match token.kind {
            TokenKind::Eof => break,
            TokenKind::Illegal => succeeded = false,
            _ => {}
        }
    }

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(PARSE_FAILURE)
    }
}

fn parse(src: &str, format: &ProgramFormat) -> ExitCode {
    let formatter: Box<dyn ParserFormatter> = match format {
        ProgramFormat::Debug => Box::new(DebugParserFormatter),
        ProgramFormat::Basic => Box::new(BasicParserFormatter::new(src)),
    };

    let (program, errors) = MonkeyParser::new(src).parse();
    if !errors.is_empty() {
        for error in errors.iter() {
            eprintln!("{}", formatter.format_error(error));
        }
        return ExitCode::from(PARSE_FAILURE);
    }
    println!("{}", formatter.format(&program));
    ExitCode::SUCCESS
}

fn run(path: &str, src: &str, format: &RunFormat) -> ExitCode {
    let parser_formatter: Box<dyn ParserFormatter + '_> = match format {
        RunFormat::Debug => Box::new(DebugParserFormatter),
        RunFormat::Basic => Box::new(BasicParserFormatter::new(src)),
        RunFormat::Pretty => Box::new(PrettyParserFormatter::new(path, src)),
    };
    let value_formatter: Box<dyn ValueFormatter> = match format {
        RunFormat::Debug => Box::new(DebugValueFormatter),
        RunFormat::Basic | RunFormat::Pretty => Box::new(BasicValueFormatter),
    };

    let (program, errors) = MonkeyParser::new(src).parse();
    if !errors.is_empty() {
        for error in errors.iter() {
            eprintln!("{}", parser_formatter.format_error(error));
        }
        return ExitCode::from(PARSE_FAILURE);
    }

    let mut evaluator = Evaluator::new(StdioContext);
    match evaluator.evaluate(&program) {
        Object::Error(error) => {
            eprintln!("{}", value_formatter.format_error(&error));
            ExitCode::from(RUNTIME_FAILURE)
        }
        Object::Null => ExitCode::SUCCESS,
        value => {
            println!("{}", value_formatter.format(&value));
            ExitCode::SUCCESS
        }
    }
}

/// One environment for the whole session, so bindings survive between lines.
fn repl() -> Result<()> {
    let mut evaluator = Evaluator::with_environment(Environment::new(), StdioContext);
    let formatter = BasicValueFormatter;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "{PROMPT}")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }

        let (program, errors) = MonkeyParser::new(&line).parse();
        if !errors.is_empty() {
            let parser_formatter = BasicParserFormatter::new(&line);
            for error in errors.iter() {
                println!("\t{}", parser_formatter.format_error(error));
            }
            continue;
        }

        match evaluator.evaluate(&program) {
            Object::Null => {}
            value => println!("{}", formatter.format(&value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_subscriber_install_fails() {
        std::env::set_var("RUST_LOG", "warn");
        assert!(init_tracing().is_ok());
        assert!(init_tracing().is_err());
    }
}
