//! Declarative route table.
//!
//! Every endpoint the API exposes is one row of [`declared_routes`]:
//! `(method, pattern, visibility, operation)`. The table is compiled once at
//! startup into a [`RouteTable`] grouped by resource family and never mutated.
//!
//! Rows are grouped by family in declaration order; that order is the
//! family priority used during lookup.

use axum::http::Method;

use super::matcher::PathPattern;

macro_rules! operations {
    ($($name:ident),+ $(,)?) => {
        /// Opaque handle naming the operation a route dispatches to.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $($name),+
        }

        impl Operation {
            /// Every operation, in declaration order.
            pub const ALL: &'static [Operation] = &[$(Operation::$name),+];

            /// Stable name used in logs and metric labels.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Operation::$name => stringify!($name)),+
                }
            }
        }
    };
}

operations! {
    // Session lifecycle
    Login,
    RefreshSession,
    Logout,
    Health,
    // Account
    GetProfile,
    UpdateProfile,
    DeleteProfile,
    ListIdentities,
    LinkIdentity,
    UnlinkIdentity,
    GetUserSettings,
    UpdateUserSettings,
    ListUserDevices,
    RegisterUserDevice,
    RemoveUserDevice,
    ListSubscriptions,
    CreateSubscription,
    GetSubscription,
    CancelSubscription,
    // Social graph
    GetUser,
    FollowUser,
    UnfollowUser,
    ListFollowers,
    ListFollowing,
    ListBlockedUsers,
    BlockUser,
    UnblockUser,
    // Workouts
    ListWorkouts,
    CreateWorkout,
    GetWorkout,
    UpdateWorkout,
    DeleteWorkout,
    ListWorkoutLikes,
    LikeWorkout,
    UnlikeWorkout,
    ListWorkoutImages,
    AddWorkoutImage,
    DeleteWorkoutImage,
    ListWorkoutExercises,
    AddWorkoutExercise,
    UpdateWorkoutExercise,
    RemoveWorkoutExercise,
    GetWorkoutSet,
    UpdateWorkoutSet,
    DeleteWorkoutSet,
    ListWorkoutExerciseSets,
    AddWorkoutExerciseSet,
    // Exercise catalogue
    ListExercises,
    CreateExercise,
    GetExercise,
    UpdateExercise,
    DeleteExercise,
    ListExerciseMuscles,
    AddExerciseMuscle,
    RemoveExerciseMuscle,
    ListMuscles,
    GetMuscle,
    // Comments
    ListComments,
    CreateComment,
    GetComment,
    UpdateComment,
    DeleteComment,
    LikeComment,
    UnlikeComment,
    // Routines
    ListRoutines,
    CreateRoutine,
    GetRoutine,
    UpdateRoutine,
    DeleteRoutine,
    ListRoutineExercises,
    AddRoutineExercise,
    UpdateRoutineExercise,
    RemoveRoutineExercise,
    ListRoutineExerciseSets,
    AddRoutineExerciseSet,
    UpdateRoutineSet,
    DeleteRoutineSet,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a route requires an authenticated caller. Fixed at declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// One uncompiled row of the route table.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub method: Method,
    pub pattern: &'static str,
    pub visibility: Visibility,
    pub operation: Operation,
}

/// A compiled, immutable route.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub pattern: PathPattern,
    pub visibility: Visibility,
    pub operation: Operation,
}

/// Routes sharing a first path segment.
#[derive(Debug, Clone)]
pub struct Family {
    pub name: &'static str,
    pub routes: Vec<Route>,
}

/// Errors detected while compiling the route table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTableError {
    #[error("route pattern is empty")]
    EmptyPattern,

    #[error("route pattern {0} must start with a literal family segment")]
    VariableFamily(&'static str),

    #[error("route pattern {0} has an unnamed variable segment")]
    UnnamedParam(&'static str),

    #[error("{method} {pattern} overlaps {method} {existing}")]
    Overlap {
        method: Method,
        pattern: &'static str,
        existing: &'static str,
    },
}

/// The compiled route table.
///
/// Public all-literal routes (login, refresh, health) form the exact set that
/// is consulted before family selection. Everything else lives in a family.
#[derive(Debug, Clone)]
pub struct RouteTable {
    exact: Vec<Route>,
    families: Vec<Family>,
}

impl RouteTable {
    /// Compile and validate a set of route rows.
    pub fn new(specs: Vec<RouteSpec>) -> Result<Self, RouteTableError> {
        let mut compiled: Vec<Route> = Vec::with_capacity(specs.len());

        for spec in specs {
            let pattern = PathPattern::parse(spec.pattern)?;
            if let Some(existing) = compiled
                .iter()
                .find(|r| r.method == spec.method && r.pattern.overlaps(&pattern))
            {
                return Err(RouteTableError::Overlap {
                    method: spec.method,
                    pattern: spec.pattern,
                    existing: existing.pattern.as_str(),
                });
            }
            compiled.push(Route {
                method: spec.method,
                pattern,
                visibility: spec.visibility,
                operation: spec.operation,
            });
        }

        let mut exact = Vec::new();
        let mut families: Vec<Family> = Vec::new();
        for route in compiled {
            if route.visibility == Visibility::Public && route.pattern.is_exact() {
                exact.push(route);
                continue;
            }
            let name = route.pattern.family();
            match families.iter_mut().find(|f| f.name == name) {
                Some(family) => family.routes.push(route),
                None => families.push(Family {
                    name,
                    routes: vec![route],
                }),
            }
        }

        Ok(Self { exact, families })
    }

    /// Compile the application's declared routes.
    pub fn declared() -> Result<Self, RouteTableError> {
        Self::new(declared_routes())
    }

    /// Exact-literal public routes, checked before family selection.
    pub fn exact(&self) -> &[Route] {
        &self.exact
    }

    /// Families in priority order.
    pub fn families(&self) -> &[Family] {
        &self.families
    }

    /// Every compiled route.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.exact
            .iter()
            .chain(self.families.iter().flat_map(|f| f.routes.iter()))
    }
}

fn public(method: Method, pattern: &'static str, operation: Operation) -> RouteSpec {
    RouteSpec {
        method,
        pattern,
        visibility: Visibility::Public,
        operation,
    }
}

fn private(method: Method, pattern: &'static str, operation: Operation) -> RouteSpec {
    RouteSpec {
        method,
        pattern,
        visibility: Visibility::Private,
        operation,
    }
}

/// The API surface.
pub fn declared_routes() -> Vec<RouteSpec> {
    use Operation::*;

    vec![
        public(Method::POST, "/auth/login", Login),
        public(Method::POST, "/auth/refresh", RefreshSession),
        public(Method::GET, "/health", Health),
        private(Method::POST, "/logout", Logout),
        // auth
        private(Method::GET, "/auth/profile", GetProfile),
        private(Method::PATCH, "/auth/profile", UpdateProfile),
        private(Method::DELETE, "/auth/profile", DeleteProfile),
        private(Method::GET, "/auth/identities", ListIdentities),
        private(Method::POST, "/auth/identities", LinkIdentity),
        private(Method::DELETE, "/auth/identities/{id}", UnlinkIdentity),
        // user-settings
        private(Method::GET, "/user-settings", GetUserSettings),
        private(Method::PUT, "/user-settings", UpdateUserSettings),
        // user-devices
        private(Method::GET, "/user-devices", ListUserDevices),
        private(Method::POST, "/user-devices", RegisterUserDevice),
        private(Method::DELETE, "/user-devices/{id}", RemoveUserDevice),
        // subscriptions
        private(Method::GET, "/subscriptions", ListSubscriptions),
        private(Method::POST, "/subscriptions", CreateSubscription),
        private(Method::GET, "/subscriptions/{id}", GetSubscription),
        private(Method::DELETE, "/subscriptions/{id}", CancelSubscription),
        // users
        private(Method::GET, "/users/{id}", GetUser),
        private(Method::POST, "/users/{id}/follow", FollowUser),
        private(Method::DELETE, "/users/{id}/follow", UnfollowUser),
        private(Method::GET, "/users/{id}/followers", ListFollowers),
        private(Method::GET, "/users/{id}/following", ListFollowing),
        // blocked-users
        private(Method::GET, "/blocked-users", ListBlockedUsers),
        private(Method::POST, "/blocked-users", BlockUser),
        private(Method::DELETE, "/blocked-users/{id}", UnblockUser),
        // workouts
        private(Method::GET, "/workouts", ListWorkouts),
        private(Method::POST, "/workouts", CreateWorkout),
        private(Method::GET, "/workouts/{id}", GetWorkout),
        private(Method::PATCH, "/workouts/{id}", UpdateWorkout),
        private(Method::DELETE, "/workouts/{id}", DeleteWorkout),
        private(Method::GET, "/workouts/{id}/likes", ListWorkoutLikes),
        private(Method::POST, "/workouts/{id}/likes", LikeWorkout),
        private(Method::DELETE, "/workouts/{id}/likes", UnlikeWorkout),
        private(Method::GET, "/workouts/{id}/images", ListWorkoutImages),
        private(Method::POST, "/workouts/{id}/images", AddWorkoutImage),
        private(Method::DELETE, "/workouts/{id}/images/{imageId}", DeleteWorkoutImage),
        private(Method::GET, "/workouts/{id}/exercises", ListWorkoutExercises),
        private(Method::POST, "/workouts/{id}/exercises", AddWorkoutExercise),
        private(Method::PATCH, "/workouts/{id}/exercises/{exerciseId}", UpdateWorkoutExercise),
        private(Method::DELETE, "/workouts/{id}/exercises/{exerciseId}", RemoveWorkoutExercise),
        // workout-sets
        private(Method::GET, "/workout-sets/{id}", GetWorkoutSet),
        private(Method::PATCH, "/workout-sets/{id}", UpdateWorkoutSet),
        private(Method::DELETE, "/workout-sets/{id}", DeleteWorkoutSet),
        // workout-exercises
        private(Method::GET, "/workout-exercises/{id}/sets", ListWorkoutExerciseSets),
        private(Method::POST, "/workout-exercises/{id}/sets", AddWorkoutExerciseSet),
        // exercises
        private(Method::GET, "/exercises", ListExercises),
        private(Method::POST, "/exercises", CreateExercise),
        private(Method::GET, "/exercises/{id}", GetExercise),
        private(Method::PATCH, "/exercises/{id}", UpdateExercise),
        private(Method::DELETE, "/exercises/{id}", DeleteExercise),
        private(Method::GET, "/exercises/{id}/muscles", ListExerciseMuscles),
        private(Method::POST, "/exercises/{id}/muscles", AddExerciseMuscle),
        private(Method::DELETE, "/exercises/{id}/muscles/{muscleId}", RemoveExerciseMuscle),
        // muscles
        private(Method::GET, "/muscles", ListMuscles),
        private(Method::GET, "/muscles/{id}", GetMuscle),
        // comments
        private(Method::GET, "/comments", ListComments),
        private(Method::POST, "/comments", CreateComment),
        private(Method::GET, "/comments/{id}", GetComment),
        private(Method::PATCH, "/comments/{id}", UpdateComment),
        private(Method::DELETE, "/comments/{id}", DeleteComment),
        private(Method::POST, "/comments/{id}/likes", LikeComment),
        private(Method::DELETE, "/comments/{id}/likes", UnlikeComment),
        // routines
        private(Method::GET, "/routines", ListRoutines),
        private(Method::POST, "/routines", CreateRoutine),
        private(Method::GET, "/routines/{id}", GetRoutine),
        private(Method::PATCH, "/routines/{id}", UpdateRoutine),
        private(Method::DELETE, "/routines/{id}", DeleteRoutine),
        private(Method::GET, "/routines/{id}/exercises", ListRoutineExercises),
        private(Method::POST, "/routines/{id}/exercises", AddRoutineExercise),
        private(Method::PATCH, "/routines/{id}/exercises/{exerciseId}", UpdateRoutineExercise),
        private(Method::DELETE, "/routines/{id}/exercises/{exerciseId}", RemoveRoutineExercise),
        // routine-exercises
        private(Method::GET, "/routine-exercises/{id}/sets", ListRoutineExerciseSets),
        private(Method::POST, "/routine-exercises/{id}/sets", AddRoutineExerciseSet),
        // routine-sets
        private(Method::PATCH, "/routine-sets/{id}", UpdateRoutineSet),
        private(Method::DELETE, "/routine-sets/{id}", DeleteRoutineSet),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_declared_table_compiles() {
        let table = RouteTable::declared().unwrap();
        assert_eq!(table.routes().count(), declared_routes().len());
    }

    #[test]
    fn test_exact_set_is_public_literals() {
        let table = RouteTable::declared().unwrap();
        let exact: Vec<&str> = table.exact().iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(exact, vec!["/auth/login", "/auth/refresh", "/health"]);
    }

    #[test]
    fn test_every_operation_is_routed_once() {
        let routes = declared_routes();
        let routed: HashSet<Operation> = routes.iter().map(|r| r.operation).collect();
        assert_eq!(routed.len(), routes.len(), "an operation is declared twice");
        for op in Operation::ALL {
            assert!(routed.contains(op), "{op} has no route");
        }
    }

    #[test]
    fn test_families_have_distinct_names() {
        let table = RouteTable::declared().unwrap();
        let names: Vec<&str> = table.families().iter().map(|f| f.name).collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len());
        assert_eq!(names.first(), Some(&"logout"));
        assert!(names.contains(&"workouts"));
        assert!(names.contains(&"workout-exercises"));
    }

    #[test]
    fn test_only_session_entrypoints_are_public() {
        let public: Vec<Operation> = declared_routes()
            .into_iter()
            .filter(|r| r.visibility == Visibility::Public)
            .map(|r| r.operation)
            .collect();
        assert_eq!(
            public,
            vec![Operation::Login, Operation::RefreshSession, Operation::Health]
        );
    }

    #[test]
    fn test_overlapping_routes_are_rejected() {
        let specs = vec![
            private(Method::GET, "/users/{id}/followers", Operation::ListFollowers),
            private(Method::GET, "/users/{userId}/{relation}", Operation::ListFollowing),
        ];
        let err = RouteTable::new(specs).unwrap_err();
        assert!(matches!(err, RouteTableError::Overlap { .. }));
    }

    #[test]
    fn test_same_shape_different_method_is_allowed() {
        let specs = vec![
            private(Method::POST, "/users/{id}/follow", Operation::FollowUser),
            private(Method::DELETE, "/users/{id}/follow", Operation::UnfollowUser),
        ];
        assert!(RouteTable::new(specs).is_ok());
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::LikeWorkout.as_str(), "LikeWorkout");
        assert_eq!(Operation::Login.to_string(), "Login");
    }
}
