//! Routes and the authentication guard
//!
//! Two states only: a token is stored or it is not. Protected routes visited
//! without a token redirect to `/login` and remember where the user was
//! going. After login the navigator always lands on `/dashboard`.

use crate::core::session::Session;

/// Screens under `/healthcare`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Companies,
    Specialties,
    Clinics,
    Doctors,
    DoctorSchedules,
    Patients,
    Appointments,
    Visits,
    Prescriptions,
    LabTests,
}

impl Screen {
    pub const ALL: [Screen; 10] = [
        Screen::Companies,
        Screen::Specialties,
        Screen::Clinics,
        Screen::Doctors,
        Screen::DoctorSchedules,
        Screen::Patients,
        Screen::Appointments,
        Screen::Visits,
        Screen::Prescriptions,
        Screen::LabTests,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Screen::Companies => "companies",
            Screen::Specialties => "specialties",
            Screen::Clinics => "clinics",
            Screen::Doctors => "doctors",
            Screen::DoctorSchedules => "doctor-schedules",
            Screen::Patients => "patients",
            Screen::Appointments => "appointments",
            Screen::Visits => "visits",
            Screen::Prescriptions => "prescriptions",
            Screen::LabTests => "lab-tests",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Unauthorized,
    Dashboard,
    Users,
    Settings,
    Healthcare(Screen),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Unauthorized => "/unauthorized".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Users => "/users".to_string(),
            Route::Settings => "/settings".to_string(),
            Route::Healthcare(screen) => format!("/healthcare/{}", screen.slug()),
        }
    }

    /// Reachable without a token
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Register | Route::Unauthorized)
    }

    /// Only meaningful without a token (login and register forms)
    pub fn is_guest_only(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

impl std::str::FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim().trim_end_matches('/');
        let route = match path {
            "" | "/" | "/dashboard" => Route::Dashboard,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/unauthorized" => Route::Unauthorized,
            "/users" => Route::Users,
            "/settings" => Route::Settings,
            other => {
                let slug = other
                    .strip_prefix("/healthcare/")
                    .ok_or_else(|| format!("Unknown route: {}", s))?;
                let screen = Screen::ALL
                    .into_iter()
                    .find(|screen| screen.slug() == slug)
                    .ok_or_else(|| format!("Unknown route: {}", s))?;
                Route::Healthcare(screen)
            }
        };
        Ok(route)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Authenticated,
    Unauthenticated,
}

impl AuthState {
    pub fn of(session: &Session) -> Self {
        if session.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }
}

/// Outcome of checking a navigation against the auth state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    Proceed,
    Redirect { to: Route, from: Route },
}

pub fn guard(route: Route, state: AuthState) -> Guard {
    match state {
        AuthState::Unauthenticated if !route.is_public() => Guard::Redirect {
            to: Route::Login,
            from: route,
        },
        AuthState::Authenticated if route.is_guest_only() => Guard::Redirect {
            to: Route::Dashboard,
            from: route,
        },
        _ => Guard::Proceed,
    }
}

/// Current location plus history
#[derive(Debug, Clone)]
pub struct Navigator {
    location: Route,
    history: Vec<Route>,
    intended: Option<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Dashboard)
    }
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            location: start,
            history: Vec::new(),
            intended: None,
        }
    }

    pub fn location(&self) -> Route {
        self.location
    }

    pub fn history(&self) -> &[Route] {
        &self.history
    }

    /// Protected route requested before the last login redirect
    pub fn intended(&self) -> Option<Route> {
        self.intended
    }

    /// Navigate through the guard, returning where we ended up
    pub fn visit(&mut self, route: Route, state: AuthState) -> Guard {
        let outcome = guard(route, state);
        let target = match &outcome {
            Guard::Proceed => route,
            Guard::Redirect { to, from } => {
                if *to == Route::Login {
                    self.intended = Some(*from);
                }
                *to
            }
        };
        self.history.push(self.location);
        self.location = target;
        outcome
    }

    /// Forced navigation: replace the location without a history entry
    pub fn replace(&mut self, route: Route) {
        self.location = route;
    }

    /// Successful login or registration
    pub fn landing_after_login(&mut self) -> Route {
        self.history.push(self.location);
        self.location = Route::Dashboard;
        self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paths() {
        assert_eq!("/login".parse::<Route>().unwrap(), Route::Login);
        assert_eq!(
            "/healthcare/lab-tests".parse::<Route>().unwrap(),
            Route::Healthcare(Screen::LabTests)
        );
        assert_eq!("/".parse::<Route>().unwrap(), Route::Dashboard);
        assert!("/healthcare/wards".parse::<Route>().is_err());
        for screen in Screen::ALL {
            let route = Route::Healthcare(screen);
            assert_eq!(route.path().parse::<Route>().unwrap(), route);
        }
    }

    #[test]
    fn test_protected_route_redirects_and_remembers() {
        let mut nav = Navigator::new(Route::Login);
        let outcome = nav.visit(
            Route::Healthcare(Screen::Appointments),
            AuthState::Unauthenticated,
        );
        assert_eq!(
            outcome,
            Guard::Redirect {
                to: Route::Login,
                from: Route::Healthcare(Screen::Appointments)
            }
        );
        assert_eq!(nav.location(), Route::Login);
        assert_eq!(nav.intended(), Some(Route::Healthcare(Screen::Appointments)));
    }

    #[test]
    fn test_login_lands_on_dashboard_not_intended() {
        let mut nav = Navigator::new(Route::Login);
        nav.visit(Route::Users, AuthState::Unauthenticated);
        assert_eq!(nav.landing_after_login(), Route::Dashboard);
        assert_eq!(nav.intended(), Some(Route::Users));
    }

    #[test]
    fn test_public_routes() {
        for route in [Route::Login, Route::Register, Route::Unauthorized] {
            assert_eq!(guard(route, AuthState::Unauthenticated), Guard::Proceed);
        }
        assert_eq!(guard(Route::Unauthorized, AuthState::Authenticated), Guard::Proceed);
        assert_eq!(
            guard(Route::Login, AuthState::Authenticated),
            Guard::Redirect {
                to: Route::Dashboard,
                from: Route::Login
            }
        );
    }

    #[test]
    fn test_forced_replace_skips_history() {
        let mut nav = Navigator::default();
        nav.visit(Route::Settings, AuthState::Authenticated);
        let depth = nav.history().len();
        nav.replace(Route::Unauthorized);
        assert_eq!(nav.location(), Route::Unauthorized);
        assert_eq!(nav.history().len(), depth);
    }
}
