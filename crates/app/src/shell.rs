//! Line-oriented front end that stands in for the video page.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use services::{ActiveQuiz, AskOutcome, AskRejection, MediaPlayer, TutorSession};
use tokio::io::{AsyncBufReadExt, BufReader};
use tutor_core::model::{MarkerStatus, QuizState, Role, Session, SnapshotOrigin};

/// Media time advanced per simulated `timeupdate`, in seconds.
const TICK_SECS: f64 = 0.25;

/// Tracks whether the simulated video is running.
#[derive(Debug, Default)]
pub struct TerminalPlayer {
    playing: AtomicBool,
}

impl TerminalPlayer {
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

impl MediaPlayer for TerminalPlayer {
    fn pause(&self) {
        if self.playing.swap(false, Ordering::SeqCst) {
            println!("  [player] paused");
        }
    }

    fn play(&self) {
        if !self.playing.swap(true, Ordering::SeqCst) {
            println!("  [player] playing");
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Load(String),
    Play { from: f64, to: f64 },
    Time(f64),
    Pause,
    Ask(String),
    Feedback(String),
    Answer(String),
    Status,
    History,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        let command = match word {
            "load" => Command::Load(non_empty(rest, "load <url|path>")?),
            "play" => {
                let mut parts = rest.split_whitespace();
                let from = seconds(parts.next(), "play <from> <to>")?;
                let to = seconds(parts.next(), "play <from> <to>")?;
                Command::Play { from, to }
            }
            "time" => Command::Time(seconds(Some(rest), "time <seconds>")?),
            "pause" => Command::Pause,
            // Blank questions go through so the session reports the rejection.
            "ask" => Command::Ask(rest.to_owned()),
            "feedback" => Command::Feedback(rest.to_owned()),
            "answer" => Command::Answer(rest.to_owned()),
            "status" => Command::Status,
            "history" => Command::History,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command: {other} (try `help`)")),
        };
        Ok(Some(command))
    }
}

fn non_empty(rest: &str, usage: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(rest.to_owned())
    }
}

fn seconds(raw: Option<&str>, usage: &str) -> Result<f64, String> {
    raw.and_then(|r| r.parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s >= 0.0)
        .ok_or_else(|| format!("usage: {usage}"))
}

/// Sample times a tick apart from `from` up to `to`, never past the end of the video.
fn sample_times(from: f64, to: f64, duration: f64) -> impl Iterator<Item = f64> {
    let end = to.min(duration);
    (0u64..)
        .map(move |tick| from + tick as f64 * TICK_SECS)
        .take_while(move |t| *t <= end)
}

pub struct Shell {
    tutor: TutorSession,
    player: Arc<TerminalPlayer>,
    duration: f64,
}

impl Shell {
    pub fn new(tutor: TutorSession, player: Arc<TerminalPlayer>, duration: f64) -> Self {
        Self {
            tutor,
            player,
            duration,
        }
    }

    pub async fn run(&self) -> std::io::Result<()> {
        print_help();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match Command::parse(&line) {
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => self.execute(command).await,
                Ok(None) => {}
                Err(message) => println!("{message}"),
            }
        }
        Ok(())
    }

    async fn execute(&self, command: Command) {
        match command {
            Command::Load(target) => self.load(&target).await,
            Command::Play { from, to } => self.play(from, to).await,
            Command::Time(t) => {
                if let Some(quiz) = self.tutor.on_time_update(t, self.duration) {
                    self.announce(&quiz).await;
                }
            }
            Command::Pause => {
                self.player.pause();
                self.tutor.on_pause().await;
            }
            Command::Ask(question) => match self.tutor.ask(&question).await {
                AskOutcome::Answered(answer) => println!("tutor: {answer}"),
                AskOutcome::Failed(message) => println!("error: {message}"),
                AskOutcome::Rejected(AskRejection::EmptyQuestion) => {
                    println!("type a question first");
                }
                AskOutcome::Rejected(AskRejection::QuizActive) => {
                    println!("{}", self.tutor.view(Session::input_placeholder));
                }
                AskOutcome::Rejected(AskRejection::Busy) => println!("still waiting on an answer"),
                AskOutcome::Discarded => println!("(answer dropped, the video changed)"),
            },
            Command::Feedback(answer) => match self.tutor.evaluate_quiz_answer(&answer).await {
                Ok(feedback) => println!("feedback: {feedback}"),
                Err(err) => println!("error: {err}"),
            },
            Command::Answer(answer) => match self.tutor.resolve_quiz(&answer) {
                Ok(()) => println!("quiz complete"),
                Err(err) => println!("error: {err}"),
            },
            Command::Status => self.tutor.view(print_status),
            Command::History => self.tutor.view(print_history),
            Command::Help => print_help(),
            Command::Quit => {}
        }
    }

    async fn load(&self, target: &str) {
        let result = if Path::new(target).is_file() {
            self.tutor.load_local(target).await
        } else {
            self.tutor.load_hosted(target).await
        };
        match result {
            Ok(report) => {
                println!(
                    "loaded: {} checkpoint(s), {} skipped{}",
                    report.checkpoints,
                    report.rejected,
                    if report.has_default_snapshot {
                        ", first frame captured"
                    } else {
                        ""
                    }
                );
                self.tutor.view(print_summary);
            }
            Err(err) => println!("error: {err}"),
        }
    }

    /// Emit `timeupdate` samples from `from` to `to` until a checkpoint pauses playback.
    async fn play(&self, from: f64, to: f64) {
        self.player.play();
        for t in sample_times(from, to, self.duration) {
            if !self.player.is_playing() {
                break;
            }
            if let Some(quiz) = self.tutor.on_time_update(t, self.duration) {
                self.announce(&quiz).await;
                return;
            }
            tokio::task::yield_now().await;
        }
        self.player.pause();
        self.tutor.on_pause().await;
    }

    async fn announce(&self, quiz: &ActiveQuiz) {
        self.tutor.on_pause().await;
        println!(
            "quiz at {:.1}%: {}",
            quiz.checkpoint.position(),
            quiz.checkpoint.prompt()
        );
        println!("  `feedback <text>` for a hint, `answer <text>` to continue");
    }
}

fn print_help() {
    println!("commands:");
    println!("  load <url|path>     analyse a hosted link or upload a local file");
    println!("  play <from> <to>    play between two times in seconds");
    println!("  time <seconds>      report a single playback position");
    println!("  pause               pause and capture the current frame");
    println!("  ask <question>      ask about the video");
    println!("  feedback <answer>   get feedback on a quiz answer");
    println!("  answer <answer>     submit a quiz answer and resume");
    println!("  status | history | help | quit");
}

fn print_summary(session: &Session) {
    println!("summary: {}", session.summary());
}

fn print_status(session: &Session) {
    match session.source() {
        Some(source) => println!("video: {} (epoch {})", source.describe(), session.epoch()),
        None => {
            println!("no video loaded");
            return;
        }
    }
    println!(
        "position: {:.1}% ({})",
        session.playback().current_position(),
        if session.playback().is_playing() {
            "playing"
        } else {
            "paused"
        }
    );
    if let QuizState::Interrupted(id) = session.quiz_state() {
        let prompt = session.active_checkpoint().map_or("", |c| c.prompt());
        println!("quiz {id}: {prompt}");
    }
    for marker in session.registry().markers() {
        let mark = match marker.status {
            MarkerStatus::Completed => 'x',
            MarkerStatus::Pending => ' ',
        };
        println!("  [{mark}] {:.1}%", marker.position);
    }
    println!(
        "snapshot: {}",
        session
            .visual()
            .grounding()
            .map_or("none", |s| match s.origin() {
                SnapshotOrigin::Default => "first frame",
                SnapshotOrigin::Pause => "paused frame",
            })
    );
    if let Some(banner) = session.banner() {
        println!("banner: {banner}");
    }
    println!("input: {}", session.input_placeholder());
}

fn print_history(session: &Session) {
    if session.history().is_empty() {
        println!("(no messages yet)");
    }
    for message in session.history().messages() {
        let who = match message.role() {
            Role::Question => "you",
            Role::Answer => "tutor",
        };
        println!("[{}] {who}: {}", message.at().format("%H:%M:%S"), message.text());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(
            Command::parse("play 10 42.5").unwrap(),
            Some(Command::Play {
                from: 10.0,
                to: 42.5
            })
        );
        assert_eq!(
            Command::parse("ask   what is a trait?  ").unwrap(),
            Some(Command::Ask("what is a trait?".into()))
        );
        assert_eq!(Command::parse("ask").unwrap(), Some(Command::Ask(String::new())));
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn playback_samples_stop_at_video_end() {
        let times: Vec<f64> = sample_times(9.0, 1e12, 10.0).collect();
        assert_eq!(times.first(), Some(&9.0));
        assert_eq!(times.last(), Some(&10.0));
        assert_eq!(times.len(), 5);

        assert_eq!(sample_times(0.0, 2.0, 600.0).count(), 9);
        assert_eq!(sample_times(12.0, 20.0, 10.0).count(), 0);
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(Command::parse("load").is_err());
        assert!(Command::parse("time soon").is_err());
        assert!(Command::parse("play 10").is_err());
        assert!(Command::parse("rewind").is_err());
    }
}
