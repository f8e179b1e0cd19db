use clap::{Parser, Subcommand};
use serde::Serialize;

use discussion_forum::client::ClientError;
use discussion_forum::ForumClient;

#[derive(Parser)]
#[command(name = "forum-cli")]
#[command(about = "Command-line client for the discussion forum", long_about = None)]
struct Cli {
    /// API service or edge proxy base URL.
    #[arg(short, long, env = "FORUM_URL", default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the API is up
    Health,
    /// Manage courses
    #[command(subcommand)]
    Courses(CourseCommand),
    /// Manage questions of a course
    #[command(subcommand)]
    Questions(QuestionCommand),
}

#[derive(Subcommand)]
enum CourseCommand {
    /// List all courses
    List,
    /// Show one course
    Get { id: i32 },
    /// Create a course
    Create { name: String },
    /// Delete a course and its questions
    Delete { id: i32 },
}

#[derive(Subcommand)]
enum QuestionCommand {
    /// List questions of a course
    List { course_id: i32 },
    /// Post a question
    Add {
        course_id: i32,
        title: String,
        text: String,
    },
    /// Upvote a question
    Upvote { course_id: i32, question_id: i32 },
    /// Delete a question
    Delete { course_id: i32, question_id: i32 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = ForumClient::new(&cli.url);

    let result = match cli.command {
        Commands::Health => print(client.health().await),
        Commands::Courses(cmd) => match cmd {
            CourseCommand::List => print(client.list_courses().await),
            CourseCommand::Get { id } => print(client.get_course(id).await),
            CourseCommand::Create { name } => print(client.create_course(&name).await),
            CourseCommand::Delete { id } => print(client.delete_course(id).await),
        },
        Commands::Questions(cmd) => match cmd {
            QuestionCommand::List { course_id } => print(client.list_questions(course_id).await),
            QuestionCommand::Add {
                course_id,
                title,
                text,
            } => print(client.add_question(course_id, &title, &text).await),
            QuestionCommand::Upvote {
                course_id,
                question_id,
            } => print(client.upvote_question(course_id, question_id).await),
            QuestionCommand::Delete {
                course_id,
                question_id,
            } => print(client.delete_question(course_id, question_id).await),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn print<T: Serialize>(result: Result<T, ClientError>) -> Result<(), Box<dyn std::error::Error>> {
    let value = result?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
