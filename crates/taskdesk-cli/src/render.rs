//! Plain-text rendering of dashboard data.

use chrono::Local;
use taskdesk_core::api::Fetched;
use taskdesk_core::models::{Invite, Task, TaskStats, User};
use taskdesk_core::utils::{format_date, truncate_string};

const TITLE_WIDTH: usize = 32;
const NAME_WIDTH: usize = 24;
const EMAIL_WIDTH: usize = 30;

fn heading<T>(title: &str, fetched: &Fetched<T>) {
    if fetched.is_demo() {
        println!("\n== {} (demo data - API unavailable) ==", title);
    } else {
        println!("\n== {} ==", title);
    }
}

pub fn print_stats(stats: &Fetched<TaskStats>) {
    heading("Task statistics", stats);
    let s = stats.value();
    println!("Total:     {}", s.total);
    println!("Completed: {} ({}%)", s.completed, s.completion_percent());
    println!("Open:      {}", s.open());
    println!("Overdue:   {}", s.overdue);
    if !s.by_category.is_empty() {
        println!("By category:");
        for (category, count) in &s.by_category {
            println!("  {:<14} {}", category, count);
        }
    }
}

pub fn print_tasks(title: &str, tasks: &Fetched<Vec<Task>>) {
    heading(title, tasks);
    print_task_table(&tasks.value().iter().collect::<Vec<_>>());
}

/// Member view: open work first, then completed and expired tasks.
pub fn print_member_tasks(tasks: &Fetched<Vec<Task>>) {
    let (active, closed) = split_closed(tasks.value());

    heading("My tasks", tasks);
    print_task_table(&active);
    heading("Completed / Expired tasks", tasks);
    print_task_table(&closed);
}

/// Split into (active, completed or expired), keeping the server order.
fn split_closed(tasks: &[Task]) -> (Vec<&Task>, Vec<&Task>) {
    let (closed, active) = tasks.iter().partition(|t| t.status.is_closed());
    (active, closed)
}

fn print_task_table(tasks: &[&Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    let today = Local::now().date_naive();
    println!(
        "{:<10} {:<width$} {:<12} {:<8} {:<12} {:<14} {}",
        "ID",
        "TITLE",
        "CATEGORY",
        "PRIORITY",
        "STATUS",
        "DUE",
        "ASSIGNEE",
        width = TITLE_WIDTH
    );
    for task in tasks {
        let due = task.due_date.as_deref().map(format_date).unwrap_or_default();
        let due = if task.is_overdue(today) {
            format!("{} !", due)
        } else {
            due
        };
        println!(
            "{:<10} {:<width$} {:<12} {:<8} {:<12} {:<14} {}",
            truncate_string(&task.id, 10),
            truncate_string(&task.title, TITLE_WIDTH),
            task.category,
            task.priority,
            task.status,
            due,
            task.assignee_name(),
            width = TITLE_WIDTH
        );
    }
}

pub fn print_task_detail(task: &Task) {
    println!("{} [{}]", task.title, task.id);
    println!("  Category:  {}", task.category);
    println!("  Priority:  {}", task.priority);
    println!("  Status:    {}", task.status);
    println!("  Assignee:  {}", task.assignee_name());
    if let Some(ref due) = task.due_date {
        println!("  Due:       {}", format_date(due));
    }
    if let Some(created) = task.created_at {
        println!("  Created:   {}", created.format("%b %d, %Y"));
    }
    if let Some(ref description) = task.description {
        println!("  {}", description);
    }
    if let Some(ref comments) = task.comments {
        println!("  Comments:  {}", comments);
    }
}

pub fn print_users(title: &str, users: &Fetched<Vec<User>>) {
    heading(title, users);
    let users = users.value();
    if users.is_empty() {
        println!("No users.");
        return;
    }
    println!("{:<26} {:<name$} {:<email$} {}", "ID", "NAME", "EMAIL", "ROLE", name = NAME_WIDTH, email = EMAIL_WIDTH);
    for user in users {
        println!(
            "{:<26} {:<name$} {:<email$} {}",
            user.id,
            truncate_string(user.display_name(), NAME_WIDTH),
            truncate_string(&user.email, EMAIL_WIDTH),
            user.role,
            name = NAME_WIDTH,
            email = EMAIL_WIDTH
        );
    }
}

pub fn print_invites(invites: &Fetched<Vec<Invite>>) {
    heading("Invitations", invites);
    let invites = invites.value();
    if invites.is_empty() {
        println!("No invitations.");
        return;
    }
    println!("{:<email$} {:<8} {}", "EMAIL", "ROLE", "STATUS", email = EMAIL_WIDTH);
    for invite in invites {
        println!(
            "{:<email$} {:<8} {}",
            truncate_string(&invite.email, EMAIL_WIDTH),
            invite.role,
            invite.status_display(),
            email = EMAIL_WIDTH
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdesk_core::models::TaskStatus;

    fn task(id: &str, status: &str) -> Task {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "title": format!("Task {}", id),
            "category": "Feature",
            "priority": "Medium",
            "status": status
        }))
        .unwrap()
    }

    #[test]
    fn test_split_closed_groups_completed_and_expired() {
        let tasks = vec![
            task("1", "Todo"),
            task("2", "Completed"),
            task("3", "In Progress"),
            task("4", "Expired"),
        ];
        let (active, closed) = split_closed(&tasks);

        let ids = |list: &[&Task]| list.iter().map(|t| t.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&active), ["1", "3"]);
        assert_eq!(ids(&closed), ["2", "4"]);
        assert_eq!(closed[1].status, TaskStatus::Expired);
    }
}
