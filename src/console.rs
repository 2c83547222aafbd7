//! In-memory todo list driven from a terminal menu.
//!
//! Nothing here touches the store or the HTTP layer; state lives for the
//! lifetime of the process.

use std::io::{self, BufRead, Write};

/// A task in the console list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleTask {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

impl ConsoleTask {
    /// One-line rendering used by the "view" menu entry.
    pub fn display_line(&self) -> String {
        let status = if self.completed { "✓" } else { "○" };
        format!("[{}] ID: {} - {}", status, self.id, self.title)
    }
}

#[derive(Debug)]
pub struct TodoApp {
    tasks: Vec<ConsoleTask>,
    next_id: u32,
}

impl Default for TodoApp {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }
}

impl TodoApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task with trimmed title and description. Returns `None` if the
    /// title is empty after trimming.
    pub fn add_task(&mut self, title: &str, description: &str) -> Option<&ConsoleTask> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        self.tasks.push(ConsoleTask {
            id: self.next_id,
            title: title.to_string(),
            description: description.trim().to_string(),
            completed: false,
        });
        self.next_id += 1;
        self.tasks.last()
    }

    pub fn list_tasks(&self) -> &[ConsoleTask] {
        &self.tasks
    }

    pub fn get_task(&self, id: u32) -> Option<&ConsoleTask> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Replaces the supplied fields. Returns `false` if no task has this id.
    pub fn update_task(&mut self, id: u32, title: Option<&str>, description: Option<&str>) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return false;
        };
        if let Some(title) = title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = description {
            task.description = description.trim().to_string();
        }
        true
    }

    pub fn delete_task(&mut self, id: u32) -> bool {
        match self.tasks.iter().position(|task| task.id == id) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn toggle_task_completion(&mut self, id: u32) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }
}

const MENU: &str = "\n--- Todo Application ---\n\
1. Add Task\n\
2. View Tasks\n\
3. Update Task\n\
4. Delete Task\n\
5. Toggle Task Completion\n\
6. Exit\n\
------------------------";

/// Prints `prompt` and reads one line. `None` on end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<Option<String>> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Reads a task id. Prints an error and returns `None` if the line is not a number.
fn prompt_id<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> io::Result<Option<Option<u32>>> {
    let Some(line) = prompt(input, output, message)? else {
        return Ok(None);
    };
    match line.parse() {
        Ok(id) => Ok(Some(Some(id))),
        Err(_) => {
            writeln!(output, "Invalid task ID. Please enter a number.")?;
            Ok(Some(None))
        }
    }
}

/// Runs the menu loop until the user picks "Exit" or input ends.
pub fn run<R: BufRead, W: Write>(app: &mut TodoApp, mut input: R, mut output: W) -> io::Result<()> {
    let input = &mut input;
    let output = &mut output;

    loop {
        writeln!(output, "{}", MENU)?;
        let Some(choice) = prompt(input, output, "Enter your choice (1-6): ")? else {
            writeln!(output, "\nExiting...")?;
            return Ok(());
        };

        match choice.as_str() {
            "1" => {
                let Some(title) = prompt(input, output, "Enter task title: ")? else {
                    return Ok(());
                };
                if title.is_empty() {
                    writeln!(output, "Task title cannot be empty!")?;
                    continue;
                }
                let Some(description) = prompt(input, output, "Enter task description (optional): ")? else {
                    return Ok(());
                };
                match app.add_task(&title, &description) {
                    Some(task) => writeln!(
                        output,
                        "Task '{}' added successfully with ID {}",
                        task.title, task.id
                    )?,
                    None => writeln!(output, "Failed to add task. Title cannot be empty.")?,
                }
            }
            "2" => {
                let tasks = app.list_tasks();
                if tasks.is_empty() {
                    writeln!(output, "No tasks available.")?;
                } else {
                    writeln!(output, "\nYour Tasks:")?;
                    for task in tasks {
                        writeln!(output, "{}", task.display_line())?;
                        if !task.description.is_empty() {
                            writeln!(output, "    Description: {}", task.description)?;
                        }
                    }
                }
            }
            "3" => {
                let Some(id) = prompt_id(input, output, "Enter task ID to update: ")? else {
                    return Ok(());
                };
                let Some(id) = id else { continue };
                let Some(task) = app.get_task(id).cloned() else {
                    writeln!(output, "Task with ID {} not found.", id)?;
                    continue;
                };

                let title_prompt = format!("Enter new title (current: '{}'): ", task.title);
                let Some(title) = prompt(input, output, &title_prompt)? else {
                    return Ok(());
                };
                let description_prompt =
                    format!("Enter new description (current: '{}'): ", task.description);
                let Some(description) = prompt(input, output, &description_prompt)? else {
                    return Ok(());
                };

                // Blank answers keep the current value.
                let title = Some(title.as_str()).filter(|s| !s.is_empty());
                let description = Some(description.as_str()).filter(|s| !s.is_empty());
                if app.update_task(id, title, description) {
                    writeln!(output, "Task with ID {} updated successfully.", id)?;
                } else {
                    writeln!(output, "Failed to update task with ID {}.", id)?;
                }
            }
            "4" => {
                let Some(id) = prompt_id(input, output, "Enter task ID to delete: ")? else {
                    return Ok(());
                };
                let Some(id) = id else { continue };
                if app.delete_task(id) {
                    writeln!(output, "Task with ID {} deleted successfully.", id)?;
                } else {
                    writeln!(output, "Task with ID {} not found.", id)?;
                }
            }
            "5" => {
                let Some(id) = prompt_id(input, output, "Enter task ID to toggle: ")? else {
                    return Ok(());
                };
                let Some(id) = id else { continue };
                if app.toggle_task_completion(id) {
                    let completed = app.get_task(id).map(|t| t.completed).unwrap_or(false);
                    let status = if completed { "completed" } else { "incomplete" };
                    writeln!(output, "Task with ID {} marked as {}.", id, status)?;
                } else {
                    writeln!(output, "Task with ID {} not found.", id)?;
                }
            }
            "6" => {
                writeln!(output, "Thank you for using the Todo Application. Goodbye!")?;
                return Ok(());
            }
            _ => writeln!(output, "Invalid choice. Please enter a number between 1 and 6.")?,
        }
    }
}
