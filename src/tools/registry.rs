//! 工具注册表
//!
//! 固定、可枚举的工具目录：名称、参数 schema、必填集合、描述。
//! 进程启动时构建一次，此后只读；describe() 按注册顺序渲染为 Planner 提示词中的工具段落。

/// 参数语义类型（渲染到提示词中，供 LLM 生成正确的参数格式）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
}

impl ParamKind {
    fn as_str(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
        }
    }
}

/// 单个参数定义
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub default: Option<&'static str>,
}

/// 单个工具定义（不可变）
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: &'static [ParamSpec],
    pub required: &'static [&'static str],
}

impl ToolSpec {
    fn is_required(&self, param: &str) -> bool {
        self.required.contains(&param)
    }
}

const SEARCH_EMAILS: ToolSpec = ToolSpec {
    name: "search_emails",
    description: "Search the user's mailbox for emails matching a query",
    parameters: &[
        ParamSpec {
            name: "query",
            kind: ParamKind::String,
            description: "Mail search query (e.g. 'from:recruiter', 'subject:meeting', 'newer_than:7d')",
            default: None,
        },
        ParamSpec {
            name: "max_results",
            kind: ParamKind::Integer,
            description: "Max emails to return",
            default: Some("5"),
        },
    ],
    required: &["query"],
};

const LIST_CALENDAR_EVENTS: ToolSpec = ToolSpec {
    name: "list_calendar_events",
    description: "List calendar events for a time range, optionally filtered by keyword",
    parameters: &[
        ParamSpec {
            name: "range",
            kind: ParamKind::String,
            description: "Time range: today, tomorrow, week or month",
            default: Some("week"),
        },
        ParamSpec {
            name: "filter",
            kind: ParamKind::String,
            description: "Keyword matched against event title, description and location",
            default: None,
        },
    ],
    required: &[],
};

const CREATE_CALENDAR_EVENT: ToolSpec = ToolSpec {
    name: "create_calendar_event",
    description: "Create a new calendar event",
    parameters: &[
        ParamSpec {
            name: "title",
            kind: ParamKind::String,
            description: "Event title/name",
            default: None,
        },
        ParamSpec {
            name: "date",
            kind: ParamKind::String,
            description: "Date in YYYY-MM-DD format",
            default: None,
        },
        ParamSpec {
            name: "start_time",
            kind: ParamKind::String,
            description: "Start time in HH:MM 24-hour format",
            default: None,
        },
        ParamSpec {
            name: "end_time",
            kind: ParamKind::String,
            description: "End time in HH:MM 24-hour format",
            default: None,
        },
        ParamSpec {
            name: "location",
            kind: ParamKind::String,
            description: "Event location (optional)",
            default: Some(""),
        },
        ParamSpec {
            name: "description",
            kind: ParamKind::String,
            description: "Event description (optional)",
            default: Some(""),
        },
    ],
    required: &["title", "date", "start_time", "end_time"],
};

const SEND_EMAIL: ToolSpec = ToolSpec {
    name: "send_email",
    description: "Send an email",
    parameters: &[
        ParamSpec {
            name: "to",
            kind: ParamKind::String,
            description: "Recipient email address (a real address, never a bare name)",
            default: None,
        },
        ParamSpec {
            name: "subject",
            kind: ParamKind::String,
            description: "Email subject line",
            default: None,
        },
        ParamSpec {
            name: "body",
            kind: ParamKind::String,
            description: "Email body content",
            default: None,
        },
    ],
    required: &["to", "subject", "body"],
};

/// 工具注册表：注册顺序即渲染顺序
pub struct ToolRegistry {
    specs: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        let mut registry = Self { specs: Vec::new() };
        registry.register(SEARCH_EMAILS);
        registry.register(LIST_CALENDAR_EVENTS);
        registry.register(CREATE_CALENDAR_EVENT);
        registry.register(SEND_EMAIL);
        registry
    }

    fn register(&mut self, spec: ToolSpec) {
        debug_assert!(
            spec.required
                .iter()
                .all(|r| spec.parameters.iter().any(|p| &p.name == r)),
            "required parameter missing from parameters: {}",
            spec.name
        );
        self.specs.push(spec);
    }

    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// 渲染为提示词段落：`name(param: type (required|optional), ...): description`
    pub fn describe(&self) -> String {
        self.specs
            .iter()
            .map(|spec| {
                let params = spec
                    .parameters
                    .iter()
                    .map(|p| {
                        format!(
                            "{}: {} ({})",
                            p.name,
                            p.kind.as_str(),
                            if spec.is_required(p.name) {
                                "required"
                            } else {
                                "optional"
                            }
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("- {}({}): {}", spec.name, params, spec.description)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
