//! Task tree construction and resolution
//!
//! The configuration descriptors are classified once into an immutable tree
//! of task nodes held in an arena; node ids double as the non-owning parent
//! back-references. Resolution walks the tree from CLI arguments down to a
//! target node, computes filter sets, and assembles the execution plan.

use crate::config::{Options, TaskDescriptor, TaskValue};
use crate::error::{ConfigError, ConfigResult, ResolutionError, Result};
use crate::runner::{Command, Environ, Plan};
use crate::ui::print_message;
use std::fmt;

/// Description given to the synthetic root task
const ROOT_DESC: &str = "General run description";

/// Description forced onto variable tasks
const VARIABLE_DESC: &str = "Prints the variable";

/// Task classification, derived once from the raw name shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Plain executable leaf
    Directive,
    /// Leaf whose output is captured into an environment variable
    Variable,
    /// Composite executed strictly in declaration order
    Sequence,
    /// Composite executed concurrently, head output streamed
    Parallel,
    /// Composite executed concurrently with interleaved tagged output
    Multiplex,
}

impl TaskKind {
    /// Modes that render a banner line in plan previews
    pub fn is_grouped(self) -> bool {
        matches!(self, TaskKind::Sequence | TaskKind::Parallel | TaskKind::Multiplex)
    }

    /// Modes inherited by nested, unparenthesized composites
    pub fn is_concurrent(self) -> bool {
        matches!(self, TaskKind::Parallel | TaskKind::Multiplex)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskKind::Directive => "directive",
            TaskKind::Variable => "variable",
            TaskKind::Sequence => "sequence",
            TaskKind::Parallel => "parallel",
            TaskKind::Multiplex => "multiplex",
        };
        write!(f, "{}", name)
    }
}

/// Arena index of one task node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskId(usize);

/// One entry of the configuration tree, immutable after construction
#[derive(Debug, Clone)]
pub struct TaskNode {
    /// Stripped name; empty for unnamed leaf entries
    pub name: String,

    /// Shell code for leaves, None for composites
    pub code: Option<String>,

    /// Classification tag
    pub kind: TaskKind,

    /// Help description
    pub desc: String,

    /// Suppress run logs for this node and its descendants
    pub quiet: bool,

    /// Skipped unless explicitly enabled or picked
    pub optional: bool,

    /// Back-reference for upward traversal; None for the root
    pub parent: Option<TaskId>,

    /// Ordered child nodes
    pub children: Vec<TaskId>,
}

/// The whole task tree plus the shared options document
#[derive(Debug, Clone)]
pub struct TaskTree {
    nodes: Vec<TaskNode>,
    pub options: Options,
}

/// Filter sets computed from `=` / `+` / `-` argument tokens
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub pick: Vec<TaskId>,
    pub enable: Vec<TaskId>,
    pub disable: Vec<TaskId>,
}

/// Outcome of resolving an argument vector against the tree
#[derive(Debug)]
pub enum Resolution {
    /// No further task path matched at the root; show full help
    RootHelp,

    /// A concrete target task was reached
    Target {
        task: TaskId,
        plan: Plan,
        filters: Filters,
        argv: Vec<String>,
        help: bool,
    },
}

impl TaskTree {
    /// Construct the tree from the root configuration descriptor
    pub fn build(descriptor: &TaskDescriptor, options: Options) -> ConfigResult<Self> {
        let mut tree = TaskTree {
            nodes: Vec::new(),
            options,
        };
        tree.insert(descriptor, None, None, false)?;
        Ok(tree)
    }

    /// Recursively classify one descriptor and its children
    fn insert(
        &mut self,
        descriptor: &TaskDescriptor,
        parent: Option<TaskId>,
        parent_kind: Option<TaskKind>,
        quiet: bool,
    ) -> ConfigResult<TaskId> {
        let mut name = descriptor.name.clone();
        let mut desc = if parent.is_none() {
            ROOT_DESC.to_string()
        } else {
            descriptor.desc.clone()
        };

        // Optional
        let mut optional = false;
        if let Some(stripped) = name.strip_prefix('/') {
            name = stripped.to_string();
            optional = true;
        }

        // Quiet
        let mut quiet = quiet;
        if name.contains('!') {
            name.retain(|c| c != '!');
            quiet = true;
        }

        // Variable kind
        let mut kind = TaskKind::Directive;
        if is_variable_name(&name) {
            kind = TaskKind::Variable;
            desc = VARIABLE_DESC.to_string();
        }

        let id = TaskId(self.nodes.len());
        self.nodes.push(TaskNode {
            name: String::new(),
            code: None,
            kind,
            desc,
            quiet,
            optional,
            parent,
            children: Vec::new(),
        });

        match &descriptor.value {
            TaskValue::Code(code) => {
                self.nodes[id.0].code = Some(code.clone());
            }
            TaskValue::Children(entries) => {
                kind = TaskKind::Sequence;
                if let Some(parent_kind) = parent_kind {
                    if parent_kind.is_concurrent() {
                        kind = parent_kind;
                    }
                }

                // One wrap of parentheses selects parallel, two multiplex;
                // grouping is only legal near the root
                if name.starts_with('(') && name.ends_with(')') {
                    if self.depth(id) >= 2 {
                        return Err(ConfigError::NestedGrouping(name));
                    }
                    name = name[1..name.len() - 1].to_string();
                    kind = TaskKind::Parallel;
                }
                if name.starts_with('(') && name.ends_with(')') {
                    name = name[1..name.len() - 1].to_string();
                    kind = TaskKind::Multiplex;
                }

                self.nodes[id.0].kind = kind;
                for entry in entries {
                    let child = self.insert(entry, Some(id), Some(kind), quiet)?;
                    self.nodes[id.0].children.push(child);
                }
            }
        }

        self.nodes[id.0].name = name;
        Ok(id)
    }

    /// The root task id
    pub fn root(&self) -> TaskId {
        TaskId(0)
    }

    /// Borrow one node
    pub fn node(&self, id: TaskId) -> &TaskNode {
        &self.nodes[id.0]
    }

    fn is_root(&self, id: TaskId) -> bool {
        self.node(id).parent.is_none()
    }

    fn is_composite(&self, id: TaskId) -> bool {
        !self.node(id).children.is_empty()
    }

    /// Ancestor chain of a node, root first
    pub fn ancestors(&self, id: TaskId) -> Vec<TaskId> {
        let mut chain = Vec::new();
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.node(parent).parent;
        }
        chain.reverse();
        chain
    }

    /// Number of ancestors above a node
    pub fn depth(&self, id: TaskId) -> usize {
        self.ancestors(id).len()
    }

    /// Space-joined non-empty names of the ancestor chain plus the node itself
    pub fn qualified_name(&self, id: TaskId) -> String {
        let mut names = Vec::new();
        for task in self.ancestors(id).into_iter().chain([id]) {
            let name = &self.node(task).name;
            if !name.is_empty() {
                names.push(name.clone());
            }
        }
        names.join(" ")
    }

    /// Variable tasks declared before the branch leading to `id`, collected
    /// at every ancestor level in declaration order
    pub fn setup_tasks(&self, id: TaskId) -> Vec<TaskId> {
        let ancestors = self.ancestors(id);
        let mut tasks = Vec::new();
        for &ancestor in &ancestors {
            for &child in &self.node(ancestor).children {
                if child == id || ancestors.contains(&child) {
                    break;
                }
                if self.node(child).kind == TaskKind::Variable {
                    tasks.push(child);
                }
            }
        }
        tasks
    }

    /// Flattened leaf descendants of `id`, or `id` itself when it is a leaf
    pub fn general_tasks(&self, id: TaskId) -> Vec<TaskId> {
        let node = self.node(id);
        if node.children.is_empty() {
            return vec![id];
        }
        let mut tasks = Vec::new();
        for &child in &node.children {
            if self.is_composite(child) {
                tasks.extend(self.general_tasks(child));
            } else {
                tasks.push(child);
            }
        }
        tasks
    }

    /// Preorder descendants of `id`, composites included
    fn descendants(&self, id: TaskId) -> Vec<TaskId> {
        let mut tasks = Vec::new();
        for &child in &self.node(id).children {
            tasks.push(child);
            if self.is_composite(child) {
                tasks.extend(self.descendants(child));
            }
        }
        tasks
    }

    /// All leaf descendants of `id` with exactly this name
    pub fn find_by_name(&self, id: TaskId, name: &str) -> Vec<TaskId> {
        self.general_tasks(id)
            .into_iter()
            .filter(|&task| self.node(task).name == name)
            .collect()
    }

    /// First-letter chained abbreviation lookup: each character of the token
    /// consumes one tree level, first prefix match wins, no backtracking
    pub fn find_by_abbreviation(&self, id: TaskId, abbreviation: &str) -> Option<TaskId> {
        let mut chars = abbreviation.chars();
        let letter = chars.next()?;
        let tail = chars.as_str();
        for &child in &self.node(id).children {
            if self.node(child).name.starts_with(letter) {
                if !tail.is_empty() {
                    return self.find_by_abbreviation(child, tail);
                }
                return Some(child);
            }
        }
        None
    }

    /// Resolve an argument vector into a target task and its plan
    pub fn resolve(&self, argv: &[String]) -> Result<Resolution> {
        self.resolve_from(self.root(), argv)
    }

    fn resolve_from(&self, id: TaskId, argv: &[String]) -> Result<Resolution> {
        // Delegate by name; exact match always wins over abbreviation
        if let Some(first) = argv.first() {
            for &child in &self.node(id).children {
                if self.node(child).name == *first {
                    return self.resolve_from(child, &argv[1..]);
                }
            }

            // Delegate by abbreviation, root only
            if self.is_root(id) {
                if let Some(task) = self.find_by_abbreviation(id, first) {
                    return self.resolve_from(task, &argv[1..]);
                }
            }
        }

        // Root task: leftover arguments mean the path did not match
        if self.is_root(id) {
            if !argv.is_empty() && !is_help_request(argv) {
                return Err(ResolutionError::TaskNotFound(argv[0].clone()).into());
            }
            return Ok(Resolution::RootHelp);
        }

        // Prepare filters
        let mut argv: Vec<String> = argv.to_vec();
        let filters = self.extract_filters(id, &mut argv);

        // Detect help
        let help = is_help_request(&argv);
        if help {
            argv.clear();
        }

        // Collect setup commands
        let mut commands = Vec::new();
        for task in self.setup_tasks(id) {
            commands.push(Command::new(
                self.qualified_name(task),
                self.node(task).code.clone().unwrap_or_default(),
                Some(self.node(task).name.clone()),
            ));
        }

        // Collect general commands
        for task in self.general_tasks(id) {
            if task != id && !filters.pick.contains(&task) {
                if self.node(task).optional && !filters.enable.contains(&task) {
                    continue;
                }
                if filters.disable.contains(&task) {
                    continue;
                }
                if !filters.pick.is_empty() {
                    continue;
                }
            }
            let node = self.node(task);
            let variable = (node.kind == TaskKind::Variable).then(|| node.name.clone());
            commands.push(Command::new(
                self.qualified_name(task),
                node.code.clone().unwrap_or_default(),
                variable,
            ));
        }

        let commands = normalize_runargs(commands);

        Ok(Resolution::Target {
            task: id,
            plan: Plan::new(commands, self.node(id).kind),
            filters,
            argv,
            help,
        })
    }

    fn extract_filters(&self, id: TaskId, argv: &mut Vec<String>) -> Filters {
        Filters {
            pick: self.consume_filter_args(id, argv, '='),
            enable: self.consume_filter_args(id, argv, '+'),
            disable: self.consume_filter_args(id, argv, '-'),
        }
    }

    /// Consume every token with the given prefix that names at least one
    /// task; unmatched tokens are left for `$RUNARGS`
    fn consume_filter_args(&self, id: TaskId, argv: &mut Vec<String>, prefix: char) -> Vec<TaskId> {
        let mut matched = Vec::new();
        argv.retain(|arg| {
            if let Some(name) = arg.strip_prefix(prefix) {
                let tasks = self.find_by_name(id, name);
                if !tasks.is_empty() {
                    matched.extend(tasks);
                    return false;
                }
            }
            true
        });
        matched
    }

    /// Resolve and act: print help or execute the plan
    pub fn run(&self, argv: &[String], environ: &mut Environ) -> Result<()> {
        match self.resolve(argv)? {
            Resolution::RootHelp => {
                self.print_help(self.root(), self.root(), None, None);
                Ok(())
            }
            Resolution::Target {
                task,
                plan,
                filters,
                argv,
                help,
            } => {
                if help {
                    // Deep targets render help from their depth-1 ancestor
                    let shown = if self.depth(task) < 2 {
                        task
                    } else {
                        self.ancestors(task)[1]
                    };
                    self.print_help(shown, task, Some(&plan), Some(&filters));
                    return Ok(());
                }
                plan.execute(&argv, environ, self.node(task).quiet, self.options.faketty)?;
                Ok(())
            }
        }
    }

    /// Print completion candidates for a partial task path
    pub fn complete(&self, argv: &[String]) {
        self.complete_from(self.root(), argv)
    }

    fn complete_from(&self, id: TaskId, argv: &[String]) {
        if let Some(first) = argv.first() {
            for &child in &self.node(id).children {
                if self.node(child).name == *first {
                    return self.complete_from(child, &argv[1..]);
                }
            }
        }
        for &child in &self.node(id).children {
            let name = &self.node(child).name;
            if !name.is_empty() {
                println!("{}", name);
            }
        }
    }

    /// Render help for `task`, annotating the selected target, filter state,
    /// and the execution plan when present
    fn print_help(&self, task: TaskId, selected: TaskId, plan: Option<&Plan>, filters: Option<&Filters>) {
        print_message(&self.qualified_name(task));
        print_message("\n---");

        let desc = &self.node(task).desc;
        if !desc.is_empty() {
            print_message("\nDescription\n");
            println!("{}", desc);
        }

        // Vars
        let mut header = false;
        for child in std::iter::once(task).chain(self.descendants(task)) {
            if self.node(child).kind != TaskKind::Variable {
                continue;
            }
            if !header {
                print_message("\nVars\n");
                header = true;
            }
            println!("{}", self.qualified_name(child));
        }

        // Tasks
        let mut header = false;
        for child in std::iter::once(task).chain(self.descendants(task)) {
            let node = self.node(child);
            if node.name.is_empty() || node.kind == TaskKind::Variable {
                continue;
            }
            if !header {
                print_message("\nTasks\n");
                header = true;
            }

            let mut message = self.qualified_name(child);
            if node.optional {
                message.push_str(" (optional)");
            }
            if let Some(filters) = filters {
                if filters.pick.contains(&child) {
                    message.push_str(" (picked)");
                }
                if filters.enable.contains(&child) {
                    message.push_str(" (enabled)");
                }
                if filters.disable.contains(&child) {
                    message.push_str(" (disabled)");
                }
            }
            if child == selected {
                message.push_str(" (selected)");
                print_message(&message);
            } else {
                println!("{}", message);
            }
        }

        // Execution plan
        if let Some(plan) = plan {
            print_message("\nExecution Plan\n");
            println!("{}", plan.explain());
        }
    }
}

/// A lone trailing `?` requests help instead of execution
fn is_help_request(argv: &[String]) -> bool {
    argv.len() == 1 && argv[0] == "?"
}

/// Non-empty names written entirely in upper-case denote variable tasks
fn is_variable_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().any(|c| c.is_uppercase())
        && !name.chars().any(|c| c.is_lowercase())
}

/// Designate the single `$RUNARGS` sink.
///
/// The first streamed command already carrying the placeholder keeps it and
/// every later occurrence is stripped, so the argument string is forwarded
/// exactly once. When no command carries the placeholder it is appended to
/// the first streamed command.
fn normalize_runargs(mut commands: Vec<Command>) -> Vec<Command> {
    let sink = commands
        .iter()
        .position(|c| !c.is_capture() && c.code.contains("$RUNARGS"));

    match sink {
        Some(index) => {
            for command in &mut commands[index + 1..] {
                command.code = command.code.replace("$RUNARGS", "");
            }
        }
        None => {
            if let Some(command) = commands.iter_mut().find(|c| !c.is_capture()) {
                command.code.push_str(" $RUNARGS");
            }
        }
    }

    commands
}
