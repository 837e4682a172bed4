use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};

use crate::client::{
    course_with_lessons, filter_courses, sign_in, AuthApi, CourseInput, CoursesApi, LessonInput, LessonsApi, RegisterRequest,
};
use crate::config::ClientConfig;
use crate::error::AppError;
use crate::guard::Decision;
use crate::identity::Role;
use crate::navigation::post_login_target;
use crate::App;

use super::{courses_table, describe_decision, describe_user, lessons_table};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { email: String, password: String, from: Option<String> },
    Register { name: String, email: String, password: String, role: Role },
    Logout,
    Whoami,
    Courses { search: Option<String> },
    Course { id: String },
    CourseCreate { input: CourseFields },
    CourseUpdate { id: String, input: CourseFields },
    CourseDelete { id: String },
    LessonAdd { course_id: String, title: String, content: String, video_url: Option<String> },
    Route { path: String },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseFields {
    pub title: String,
    pub description: String,
    pub category: String,
}

impl From<&CourseFields> for CourseInput {
    fn from(f: &CourseFields) -> Self {
        CourseInput { title: f.title.clone(), description: f.description.clone(), category: f.category.clone() }
    }
}

/// Parsed command line: global overrides plus one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub api: Option<String>,
    pub session_dir: Option<PathBuf>,
    pub command: Command,
}

impl Invocation {
    pub fn config(&self, mut base: ClientConfig) -> ClientConfig {
        if let Some(api) = &self.api { base.base_url = api.clone(); }
        if let Some(dir) = &self.session_dir { base.session_dir = dir.clone(); }
        base
    }
}

impl Command {
    /// Screen whose admission rules this command is held to, if any.
    pub fn screen_path(&self) -> Option<String> {
        match self {
            Command::Courses { .. } => Some("/courses".to_string()),
            Command::Course { id } => Some(format!("/lessons/{}", urlencoding::encode(id))),
            Command::CourseCreate { .. } => Some("/add-course".to_string()),
            Command::CourseUpdate { id, .. } | Command::CourseDelete { id } => {
                Some(format!("/edit-course/{}", urlencoding::encode(id)))
            }
            Command::LessonAdd { course_id, .. } => Some(format!("/add-lesson/{}", urlencoding::encode(course_id))),
            Command::Login { .. }
            | Command::Register { .. }
            | Command::Logout
            | Command::Whoami
            | Command::Route { .. }
            | Command::Help => None,
        }
    }
}

pub fn usage(program: &str) -> String {
    format!(
        "Usage:\n  {program} [--api <url>] [--session-dir <dir>] <command> [args]\n\nCommands:\n  login --email <e> --password <p> [--from <path>]\n  register --name <n> --email <e> --password <p> [--role student|instructor]\n  logout\n  whoami\n  courses [--search <text>]\n  course <id>                                 course details and lessons\n  course-create --title <t> --description <d> --category <c>\n  course-update <id> --title <t> --description <d> --category <c>\n  course-delete <id>\n  lesson-add <courseId> --title <t> --content <c> [--video-url <u>]\n  route <path>                                show the admission decision for a screen\n  help\n\nEnvironment:\n  LEARNHUB_API_BASE      backend base URL\n  LEARNHUB_SESSION_DIR   session storage directory\n  RUST_LOG               log filter (default info)"
    )
}

struct Flags {
    positional: Vec<String>,
    named: Vec<(String, String)>,
}

impl Flags {
    fn take(&mut self, name: &str) -> Option<String> {
        let idx = self.named.iter().position(|(k, _)| k == name)?;
        Some(self.named.remove(idx).1)
    }

    fn require(&mut self, name: &str) -> Result<String> {
        self.take(name).ok_or_else(|| anyhow!("--{} is required", name))
    }

    fn positional(&mut self, what: &str) -> Result<String> {
        if self.positional.is_empty() { bail!("missing <{}>", what); }
        Ok(self.positional.remove(0))
    }

    fn finish(self) -> Result<()> {
        if let Some(p) = self.positional.first() { bail!("unexpected argument: {}", p); }
        if let Some((k, _)) = self.named.first() { bail!("unknown flag: --{}", k); }
        Ok(())
    }
}

fn split_flags(args: &[String]) -> Result<Flags> {
    let mut positional = Vec::new();
    let mut named = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let a = &args[i];
        if let Some(name) = a.strip_prefix("--") {
            if let Some((k, v)) = name.split_once('=') {
                named.push((k.to_string(), v.to_string()));
                i += 1;
                continue;
            }
            if i + 1 >= args.len() { bail!("--{} requires a value", name); }
            named.push((name.to_string(), args[i + 1].clone()));
            i += 2;
            continue;
        }
        positional.push(a.clone());
        i += 1;
    }
    Ok(Flags { positional, named })
}

/// Parse the arguments after the program name.
pub fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut api = None;
    let mut session_dir = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--api" => {
                if i + 1 >= args.len() { bail!("--api requires a URL"); }
                api = Some(args[i + 1].clone());
                i += 2;
            }
            "--session-dir" => {
                if i + 1 >= args.len() { bail!("--session-dir requires a path"); }
                session_dir = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "-h" | "--help" => {
                return Ok(Invocation { api, session_dir, command: Command::Help });
            }
            _ => break,
        }
    }
    let Some(name) = args.get(i) else {
        return Ok(Invocation { api, session_dir, command: Command::Help });
    };
    let mut f = split_flags(&args[i + 1..])?;
    let command = match name.as_str() {
        "login" => Command::Login { email: f.require("email")?, password: f.require("password")?, from: f.take("from") },
        "register" => Command::Register {
            name: f.require("name")?,
            email: f.require("email")?,
            password: f.require("password")?,
            role: f.take("role").map(|r| Role::parse(&r)).unwrap_or(Role::Student),
        },
        "logout" => Command::Logout,
        "whoami" => Command::Whoami,
        "courses" => Command::Courses { search: f.take("search") },
        "course" => Command::Course { id: f.positional("id")? },
        "course-create" => Command::CourseCreate { input: course_fields(&mut f)? },
        "course-update" => {
            let id = f.positional("id")?;
            Command::CourseUpdate { id, input: course_fields(&mut f)? }
        }
        "course-delete" => Command::CourseDelete { id: f.positional("id")? },
        "lesson-add" => Command::LessonAdd {
            course_id: f.positional("courseId")?,
            title: f.require("title")?,
            content: f.require("content")?,
            video_url: f.take("video-url"),
        },
        "route" => Command::Route { path: f.positional("path")? },
        "help" => Command::Help,
        other => bail!("unknown command: {}", other),
    };
    f.finish()?;
    Ok(Invocation { api, session_dir, command })
}

fn course_fields(f: &mut Flags) -> Result<CourseFields> {
    Ok(CourseFields { title: f.require("title")?, description: f.require("description")?, category: f.require("category")? })
}

/// Turn an API failure into the message a user sees. A rejected credential has
/// already cleared the session; point the user back at login.
fn report(app: &App, err: AppError, screen: &str) -> anyhow::Error {
    match app.navigator.recover(&err, screen) {
        Some(decision) => anyhow!("session expired or invalid; {}. Run `login` again.", describe_decision(&decision)),
        None => anyhow!("{}", err.message()),
    }
}

/// Execute one command against an assembled app. Returns the text to print.
pub async fn run(app: &App, command: &Command) -> Result<String> {
    let screen = command.screen_path();
    if let Some(path) = &screen {
        let nav = app.navigator.navigate(path);
        if let Decision::RedirectTo { .. } = nav.decision {
            bail!("not permitted here: {}", describe_decision(&nav.decision));
        }
    }
    let here = screen.as_deref().unwrap_or("/");

    match command {
        Command::Help => Ok(usage("learnhub")),
        Command::Login { email, password, from } => {
            let user = sign_in(&app.pipeline, &app.session, email, password)
                .await
                .map_err(|e| match e {
                    AppError::AuthorizationRejected { .. } => anyhow!("Invalid email or password."),
                    other => anyhow!("{}", other.message()),
                })?;
            Ok(format!("Logged in as {}\nnext: {}", describe_user(&user), post_login_target(from.as_deref())))
        }
        Command::Register { name, email, password, role } => {
            let req = RegisterRequest { name: name.clone(), email: email.clone(), password: password.clone(), role: role.clone() };
            AuthApi::new(&app.pipeline).register(&req).await.map_err(|e| anyhow!("{}", e.message()))?;
            Ok("Registration successful. Please login to continue.".to_string())
        }
        Command::Logout => {
            app.session.logout()?;
            Ok("Logged out.".to_string())
        }
        Command::Whoami => match app.session.current_user() {
            Some(u) => Ok(describe_user(&u)),
            None => Ok("not logged in".to_string()),
        },
        Command::Courses { search } => {
            let all = CoursesApi::new(&app.pipeline).list().await.map_err(|e| report(app, e, here))?;
            let shown = filter_courses(&all, search.as_deref().unwrap_or(""));
            if shown.is_empty() {
                return Ok("no courses".to_string());
            }
            Ok(courses_table(&shown))
        }
        Command::Course { id } => {
            let (course, lessons) = course_with_lessons(&app.pipeline, id).await.map_err(|e| report(app, e, here))?;
            let mut out = format!("{} [{}]\n{}\n", course.title, course.category, course.description);
            if lessons.is_empty() {
                out.push_str("no lessons yet\n");
            } else {
                out.push_str(&lessons_table(&lessons));
            }
            Ok(out)
        }
        Command::CourseCreate { input } => {
            CoursesApi::new(&app.pipeline).create(&input.into()).await.map_err(|e| report(app, e, here))?;
            Ok("Course created.".to_string())
        }
        Command::CourseUpdate { id, input } => {
            CoursesApi::new(&app.pipeline).update(id, &input.into()).await.map_err(|e| report(app, e, here))?;
            Ok("Course updated.".to_string())
        }
        Command::CourseDelete { id } => {
            CoursesApi::new(&app.pipeline).delete(id).await.map_err(|e| report(app, e, here))?;
            Ok("Course deleted.".to_string())
        }
        Command::LessonAdd { course_id, title, content, video_url } => {
            let input = LessonInput::new(title.as_str(), content.as_str(), video_url.as_deref());
            LessonsApi::new(&app.pipeline).create(course_id, &input).await.map_err(|e| report(app, e, here))?;
            Ok("Lesson created.".to_string())
        }
        Command::Route { path } => {
            let nav = app.navigator.navigate(path);
            Ok(format!("{} -> {:?}: {}", nav.resolved.path, nav.resolved.screen, describe_decision(&nav.decision)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &[&str]) -> Vec<String> { s.iter().map(|x| x.to_string()).collect() }

    #[test]
    fn parses_globals_and_login() {
        let inv = parse_args(&args(&["--api", "http://h", "login", "--email", "a@x.com", "--password=pw"])).unwrap();
        assert_eq!(inv.api.as_deref(), Some("http://h"));
        assert_eq!(inv.command, Command::Login { email: "a@x.com".into(), password: "pw".into(), from: None });
    }

    #[test]
    fn parses_positional_and_defaults() {
        let inv = parse_args(&args(&["lesson-add", "c1", "--title", "T", "--content", "C"])).unwrap();
        assert_eq!(
            inv.command,
            Command::LessonAdd { course_id: "c1".into(), title: "T".into(), content: "C".into(), video_url: None }
        );
        let inv = parse_args(&args(&["register", "--name", "N", "--email", "e", "--password", "p", "--role", "Instructor"])).unwrap();
        assert!(matches!(inv.command, Command::Register { role: Role::Instructor, .. }));
        assert_eq!(parse_args(&[]).unwrap().command, Command::Help);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&args(&["login", "--email", "a"])).is_err());
        assert!(parse_args(&args(&["frobnicate"])).is_err());
        assert!(parse_args(&args(&["logout", "--force", "yes"])).is_err());
        assert!(parse_args(&args(&["course"])).is_err());
    }

    #[test]
    fn commands_map_to_screens() {
        assert_eq!(Command::CourseDelete { id: "a b".into() }.screen_path().as_deref(), Some("/edit-course/a%20b"));
        assert_eq!(Command::Logout.screen_path(), None);
        assert_eq!(Command::Courses { search: None }.screen_path().as_deref(), Some("/courses"));
    }

    #[test]
    fn invocation_overrides_config() {
        let inv = parse_args(&args(&["--session-dir", "/tmp/s", "whoami"])).unwrap();
        let cfg = inv.config(ClientConfig::from_lookup(|_| None));
        assert_eq!(cfg.session_dir, PathBuf::from("/tmp/s"));
        assert_eq!(cfg.base_url, crate::config::DEFAULT_API_BASE);
    }
}
