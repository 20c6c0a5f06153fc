//! Action dispatch table
//!
//! The set of control-plane actions is closed, so the action-to-route
//! mapping is a pure `const fn` rather than a mutable global map. The
//! dispatcher combines the route with the app scope and machine id to build
//! the final endpoint; this module never sees URLs.

/// HTTP verb used by an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read-only request
    Get,
    /// Mutating request with an optional body
    Post,
    /// Removal request
    Delete,
}

impl Method {
    /// Wire name of the verb
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// Verb and machine-relative sub-path for one action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// HTTP verb
    pub method: Method,
    /// Path segment appended after the machine id; empty for collection or
    /// bare-machine endpoints
    pub subpath: &'static str,
}

/// Every operation the client can ask the dispatcher to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create a new machine
    Launch,
    /// Replace a machine's configuration
    Update,
    /// Boot a stopped machine
    Start,
    /// Halt a running machine
    Stop,
    /// Stop-then-start cycle
    Restart,
    /// Block until the machine reaches a target state
    Wait,
    /// Fetch one machine
    Get,
    /// Fetch all machines, optionally filtered by state
    List,
    /// Destroy a machine
    Destroy,
    /// Send SIGKILL to a machine
    Kill,
    /// Read the current lease without acquiring it
    FindLease,
    /// Acquire an exclusive lease
    AcquireLease,
    /// Extend a held lease
    RefreshLease,
    /// Release a held lease
    ReleaseLease,
    /// Run a command inside the machine
    Exec,
    /// List processes inside the machine
    Processes,
    /// Take the machine out of the routing pool
    Cordon,
    /// Put the machine back into the routing pool
    Uncordon,
}

impl Action {
    /// Verb and sub-path for this action
    pub const fn route(self) -> Route {
        match self {
            Self::Launch => Route {
                method: Method::Post,
                subpath: "",
            },
            Self::Update => Route {
                method: Method::Post,
                subpath: "",
            },
            Self::Start => Route {
                method: Method::Post,
                subpath: "start",
            },
            Self::Stop => Route {
                method: Method::Post,
                subpath: "stop",
            },
            Self::Restart => Route {
                method: Method::Post,
                subpath: "restart",
            },
            Self::Wait => Route {
                method: Method::Get,
                subpath: "wait",
            },
            Self::Get => Route {
                method: Method::Get,
                subpath: "",
            },
            Self::List => Route {
                method: Method::Get,
                subpath: "",
            },
            Self::Destroy => Route {
                method: Method::Delete,
                subpath: "",
            },
            Self::Kill => Route {
                method: Method::Post,
                subpath: "signal",
            },
            Self::FindLease => Route {
                method: Method::Get,
                subpath: "lease",
            },
            Self::AcquireLease => Route {
                method: Method::Post,
                subpath: "lease",
            },
            Self::RefreshLease => Route {
                method: Method::Post,
                subpath: "lease",
            },
            Self::ReleaseLease => Route {
                method: Method::Delete,
                subpath: "lease",
            },
            Self::Exec => Route {
                method: Method::Post,
                subpath: "exec",
            },
            Self::Processes => Route {
                method: Method::Get,
                subpath: "ps",
            },
            Self::Cordon => Route {
                method: Method::Post,
                subpath: "cordon",
            },
            Self::Uncordon => Route {
                method: Method::Post,
                subpath: "uncordon",
            },
        }
    }

    /// Stable name used in log fields and error messages
    pub const fn name(self) -> &'static str {
        match self {
            Self::Launch => "launch",
            Self::Update => "update",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Wait => "wait",
            Self::Get => "get",
            Self::List => "list",
            Self::Destroy => "destroy",
            Self::Kill => "kill",
            Self::FindLease => "find_lease",
            Self::AcquireLease => "acquire_lease",
            Self::RefreshLease => "refresh_lease",
            Self::ReleaseLease => "release_lease",
            Self::Exec => "exec",
            Self::Processes => "processes",
            Self::Cordon => "cordon",
            Self::Uncordon => "uncordon",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lease_actions_share_a_subpath() {
        assert_eq!(Action::FindLease.route().subpath, "lease");
        assert_eq!(Action::AcquireLease.route().subpath, "lease");
        assert_eq!(Action::RefreshLease.route().subpath, "lease");
        assert_eq!(Action::ReleaseLease.route().subpath, "lease");

        assert_eq!(Action::FindLease.route().method, Method::Get);
        assert_eq!(Action::AcquireLease.route().method, Method::Post);
        assert_eq!(Action::ReleaseLease.route().method, Method::Delete);
    }

    #[test]
    fn reads_are_gets_and_removals_are_deletes() {
        assert_eq!(Action::Get.route().method, Method::Get);
        assert_eq!(Action::List.route().method, Method::Get);
        assert_eq!(Action::Wait.route().method, Method::Get);
        assert_eq!(Action::Processes.route().method, Method::Get);
        assert_eq!(Action::Destroy.route().method, Method::Delete);
    }
}
