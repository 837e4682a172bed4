//! Screen routing for the client.
//!
//! The route table maps paths (with `:param` segments) to screens and their declared
//! requirement. `Navigator` is the top-level navigation owner: it runs the admission
//! guard against the live session and turns `AuthorizationRejected` results into a
//! redirect to login.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::AppError;
use crate::guard::{self, Decision, Requirement, DEFAULT_AUTHENTICATED_PATH, LOGIN_PATH};
use crate::identity::{SessionContext, SessionFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Index,
    Login,
    Register,
    Dashboard,
    Courses,
    AddCourse,
    EditCourse,
    Lessons,
    AddLesson,
    NotFound,
}

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub pattern: &'static str,
    pub screen: Screen,
    pub requirement: Requirement,
}

pub const ROUTES: &[Route] = &[
    Route { pattern: "/", screen: Screen::Index, requirement: Requirement::Public },
    Route { pattern: "/login", screen: Screen::Login, requirement: Requirement::Public },
    Route { pattern: "/register", screen: Screen::Register, requirement: Requirement::Public },
    Route { pattern: "/dashboard", screen: Screen::Dashboard, requirement: Requirement::RequiresAuth },
    Route { pattern: "/courses", screen: Screen::Courses, requirement: Requirement::RequiresAuth },
    Route { pattern: "/add-course", screen: Screen::AddCourse, requirement: Requirement::RequiresInstructor },
    Route { pattern: "/edit-course/:id", screen: Screen::EditCourse, requirement: Requirement::RequiresInstructor },
    Route { pattern: "/lessons/:courseId", screen: Screen::Lessons, requirement: Requirement::RequiresAuth },
    Route { pattern: "/add-lesson/:courseId", screen: Screen::AddLesson, requirement: Requirement::RequiresInstructor },
];

/// A path matched against the route table. Unknown paths resolve to `NotFound`,
/// which is public.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub path: String,
    pub screen: Screen,
    pub requirement: Requirement,
    pub params: BTreeMap<String, String>,
}

impl Resolved {
    pub fn param(&self, name: &str) -> Option<&str> { self.params.get(name).map(|s| s.as_str()) }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let pat = segments(pattern);
    let got = segments(path);
    if pat.len() != got.len() { return None; }
    let mut params = BTreeMap::new();
    for (p, g) in pat.iter().zip(got.iter()) {
        if let Some(name) = p.strip_prefix(':') {
            let value = urlencoding::decode(g).map(|c| c.into_owned()).unwrap_or_else(|_| g.to_string());
            params.insert(name.to_string(), value);
        } else if p != g {
            return None;
        }
    }
    Some(params)
}

pub fn resolve(path: &str) -> Resolved {
    let clean = path.split(['?', '#']).next().unwrap_or("");
    let clean = if clean.is_empty() { "/" } else { clean };
    for r in ROUTES {
        if let Some(params) = match_pattern(r.pattern, clean) {
            return Resolved { path: clean.to_string(), screen: r.screen, requirement: r.requirement, params };
        }
    }
    Resolved { path: clean.to_string(), screen: Screen::NotFound, requirement: Requirement::Public, params: BTreeMap::new() }
}

/// Where to go after a successful login: the preserved destination, else the default
/// landing screen. Login/register themselves are never a return target.
pub fn post_login_target(from: Option<&str>) -> String {
    match from {
        Some(p) if !p.is_empty() && !matches!(resolve(p).screen, Screen::Login | Screen::Register) => p.to_string(),
        _ => DEFAULT_AUTHENTICATED_PATH.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub path: &'static str,
    pub label: &'static str,
}

/// Navigation bar entries for the current session.
pub fn nav_links(flags: SessionFlags) -> Vec<NavLink> {
    if !flags.is_authenticated { return Vec::new(); }
    let mut links = vec![
        NavLink { path: "/dashboard", label: "Home" },
        NavLink { path: "/courses", label: "Courses" },
    ];
    if flags.is_instructor {
        links.push(NavLink { path: "/add-course", label: "Add Course" });
    }
    links
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub resolved: Resolved,
    pub decision: Decision,
}

pub struct Navigator {
    session: Arc<SessionContext>,
}

impl Navigator {
    pub fn new(session: Arc<SessionContext>) -> Self { Self { session } }

    pub fn session(&self) -> &Arc<SessionContext> { &self.session }

    pub fn navigate(&self, path: &str) -> Navigation {
        let resolved = resolve(path);
        let decision = guard::admit(resolved.requirement, self.session.flags(), &resolved.path);
        debug!(target: "learnhub::nav", path = %resolved.path, screen = ?resolved.screen, decision = ?decision, "navigate");
        Navigation { resolved, decision }
    }

    /// Forced re-login after the backend rejected the credential. Other errors are
    /// left to the screen that issued the request.
    pub fn recover(&self, err: &AppError, current_path: &str) -> Option<Decision> {
        if !err.is_authorization_rejected() { return None; }
        info!(target: "learnhub::nav", from = %current_path, "credential rejected; redirecting to {}", LOGIN_PATH);
        Some(Decision::to_login(current_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Role, SessionStore, User};

    #[test]
    fn resolves_static_and_param_routes() {
        assert_eq!(resolve("/").screen, Screen::Index);
        assert_eq!(resolve("").screen, Screen::Index);
        assert_eq!(resolve("/courses/").screen, Screen::Courses);

        let r = resolve("/edit-course/abc123?tab=1");
        assert_eq!(r.screen, Screen::EditCourse);
        assert_eq!(r.requirement, Requirement::RequiresInstructor);
        assert_eq!(r.param("id"), Some("abc123"));
        assert_eq!(r.path, "/edit-course/abc123");

        let r = resolve("/lessons/c%2F1");
        assert_eq!(r.screen, Screen::Lessons);
        assert_eq!(r.param("courseId"), Some("c/1"));
    }

    #[test]
    fn unknown_paths_are_public_not_found() {
        let r = resolve("/lessons");
        assert_eq!(r.screen, Screen::NotFound);
        assert_eq!(r.requirement, Requirement::Public);
        assert_eq!(resolve("/edit-course/1/extra").screen, Screen::NotFound);
    }

    #[test]
    fn post_login_target_defaults() {
        assert_eq!(post_login_target(None), "/dashboard");
        assert_eq!(post_login_target(Some("")), "/dashboard");
        assert_eq!(post_login_target(Some("/login")), "/dashboard");
        assert_eq!(post_login_target(Some("/lessons/7")), "/lessons/7");
    }

    #[test]
    fn nav_links_follow_role() {
        assert!(nav_links(SessionFlags::LOGGED_OUT).is_empty());
        let student = nav_links(SessionFlags { is_authenticated: true, is_instructor: false });
        assert_eq!(student.iter().map(|l| l.path).collect::<Vec<_>>(), vec!["/dashboard", "/courses"]);
        let instructor = nav_links(SessionFlags { is_authenticated: true, is_instructor: true });
        assert_eq!(instructor.last().map(|l| l.label), Some("Add Course"));
    }

    #[test]
    fn navigator_uses_live_session() {
        let ctx = Arc::new(SessionContext::new(Arc::new(SessionStore::in_memory())));
        let nav = Navigator::new(ctx.clone());

        let n = nav.navigate("/add-lesson/9");
        assert_eq!(n.decision, Decision::to_login("/add-lesson/9"));

        ctx.login(User::new("1", "Sam", "s@x.com", Role::Student), "t").unwrap();
        assert_eq!(nav.navigate("/add-lesson/9").decision, Decision::to_default());
        assert!(nav.navigate("/lessons/9").decision.is_admit());

        ctx.login(User::new("2", "Ada", "a@x.com", Role::Instructor), "t2").unwrap();
        let n = nav.navigate("/add-lesson/9");
        assert!(n.decision.is_admit());
        assert_eq!(n.resolved.param("courseId"), Some("9"));
    }

    #[test]
    fn recover_only_on_rejection() {
        let ctx = Arc::new(SessionContext::new(Arc::new(SessionStore::in_memory())));
        let nav = Navigator::new(ctx);
        assert_eq!(
            nav.recover(&AppError::rejected("unauthorized", "expired"), "/courses"),
            Some(Decision::to_login("/courses"))
        );
        assert_eq!(nav.recover(&AppError::not_found("not_found", "gone"), "/courses"), None);
    }
}
