use std::io::{self, BufRead, Write};

use tracing::{error, warn};
use user_server::application::user_service::UserService;
use user_server::data::user_repository::UserRepository;
use user_server::domain::error::DomainError;
use user_server::domain::user::{FieldUpdate, NewUser, User, UserPatch};
use uuid::Uuid;

enum Flow {
    Continue,
    Exit,
}

/// Interactive user management menu over arbitrary line input and text output.
pub struct Console<R: UserRepository + 'static, I, O> {
    service: UserService<R>,
    input: I,
    output: O,
}

impl<R, I, O> Console<R, I, O>
where
    R: UserRepository + 'static,
    I: BufRead,
    O: Write,
{
    pub fn new(service: UserService<R>, input: I, output: O) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> O {
        self.output
    }

    /// Runs until the user picks "Exit" or input is exhausted.
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            self.show_menu()?;
            let Some(choice) = self.prompt("\nChoose an option (1-6): ")? else {
                return Ok(());
            };

            let flow = match choice.trim() {
                "1" => self.create_user().await?,
                "2" => self.find_user().await?,
                "3" => self.list_users().await?,
                "4" => self.update_user().await?,
                "5" => self.delete_user().await?,
                "6" => {
                    writeln!(self.output, "Exiting...")?;
                    Flow::Exit
                }
                other => {
                    warn!(choice = other, "invalid menu choice");
                    writeln!(
                        self.output,
                        "Invalid choice. Please enter a number from 1 to 6."
                    )?;
                    Flow::Continue
                }
            };

            if let Flow::Exit = flow {
                return Ok(());
            }
        }
    }

    fn show_menu(&mut self) -> io::Result<()> {
        let rule = "=".repeat(40);
        writeln!(self.output, "\n{rule}")?;
        writeln!(self.output, "        USER MANAGEMENT SYSTEM")?;
        writeln!(self.output, "{rule}")?;
        writeln!(self.output, "1. Create user")?;
        writeln!(self.output, "2. Find user by ID")?;
        writeln!(self.output, "3. List all users")?;
        writeln!(self.output, "4. Update user")?;
        writeln!(self.output, "5. Delete user")?;
        writeln!(self.output, "6. Exit")?;
        writeln!(self.output, "{}", "-".repeat(40))
    }

    /// Prints `label` and reads one line without its terminator; `None` on EOF.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt_id(&mut self, label: &str) -> io::Result<Option<Result<Uuid, ()>>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => Ok(Some(Ok(id))),
            Err(_) => {
                warn!(input = %raw, "invalid user id");
                writeln!(self.output, "Error: ID must be a valid UUID!")?;
                Ok(Some(Err(())))
            }
        }
    }

    async fn create_user(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n=== Create user ===")?;

        let Some(name) = self.prompt("Name: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(email) = self.prompt("Email: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(age) = self.prompt("Age: ")? else {
            return Ok(Flow::Exit);
        };
        let Ok(age) = age.trim().parse::<i32>() else {
            writeln!(self.output, "Error: age must be a number!")?;
            return Ok(Flow::Continue);
        };

        match self.service.create_user(NewUser::new(name, email, age)).await {
            Ok(user) => writeln!(self.output, "User created with ID: {}", user.id)?,
            Err(e) => self.report("Could not create user", &e)?,
        }
        Ok(Flow::Continue)
    }

    async fn find_user(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n=== Find user by ID ===")?;

        let id = match self.prompt_id("User ID: ")? {
            None => return Ok(Flow::Exit),
            Some(Err(())) => return Ok(Flow::Continue),
            Some(Ok(id)) => id,
        };

        match self.service.get_user(id).await {
            Ok(user) => self.display(&user)?,
            Err(e) => self.report("Could not find user", &e)?,
        }
        Ok(Flow::Continue)
    }

    async fn list_users(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n=== All users ===")?;

        match self.service.list_users().await {
            Ok(users) if users.is_empty() => writeln!(self.output, "No users found.")?,
            Ok(users) => {
                for user in &users {
                    self.display(user)?;
                }
                writeln!(self.output, "\nTotal users: {}", users.len())?;
            }
            Err(e) => self.report("Could not list users", &e)?,
        }
        Ok(Flow::Continue)
    }

    async fn update_user(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n=== Update user ===")?;

        let id = match self.prompt_id("User ID to update: ")? {
            None => return Ok(Flow::Exit),
            Some(Err(())) => return Ok(Flow::Continue),
            Some(Ok(id)) => id,
        };
        let Some(name) = self.prompt("New name (Enter to keep current): ")? else {
            return Ok(Flow::Exit);
        };
        let Some(email) = self.prompt("New email (Enter to keep current): ")? else {
            return Ok(Flow::Exit);
        };
        let Some(age) = self.prompt("New age (Enter to keep current): ")? else {
            return Ok(Flow::Exit);
        };

        let age = match age.trim() {
            "" => FieldUpdate::Keep,
            raw => match raw.parse::<i32>() {
                Ok(age) => FieldUpdate::Set(age),
                Err(_) => {
                    writeln!(self.output, "Error: age must be a number!")?;
                    return Ok(Flow::Continue);
                }
            },
        };
        let patch = UserPatch {
            name: text_update(name),
            email: text_update(email),
            age,
        };

        match self.service.update_user(id, patch).await {
            Ok(user) => {
                writeln!(self.output, "User updated.")?;
                self.display(&user)?;
            }
            Err(e) => self.report("Could not update user", &e)?,
        }
        Ok(Flow::Continue)
    }

    async fn delete_user(&mut self) -> io::Result<Flow> {
        writeln!(self.output, "\n=== Delete user ===")?;

        let id = match self.prompt_id("User ID to delete: ")? {
            None => return Ok(Flow::Exit),
            Some(Err(())) => return Ok(Flow::Continue),
            Some(Ok(id)) => id,
        };
        let Some(confirmation) = self.prompt(&format!("Delete user {id}? (y/N): "))? else {
            return Ok(Flow::Exit);
        };

        if !matches!(confirmation.trim().to_lowercase().as_str(), "y" | "yes") {
            writeln!(self.output, "Deletion cancelled.")?;
            return Ok(Flow::Continue);
        }

        match self.service.delete_user(id).await {
            Ok(()) => writeln!(self.output, "User deleted.")?,
            Err(e) => self.report("Could not delete user", &e)?,
        }
        Ok(Flow::Continue)
    }

    fn display(&mut self, user: &User) -> io::Result<()> {
        writeln!(
            self.output,
            "ID: {} | Name: {:<20} | Email: {:<25} | Age: {:<3} | Created: {}",
            user.id,
            user.name,
            user.email,
            user.age,
            user.created_at.format("%Y-%m-%d %H:%M:%S")
        )
    }

    fn report(&mut self, action: &str, err: &DomainError) -> io::Result<()> {
        match err {
            DomainError::Internal(detail) => {
                error!(detail = %detail, "{}", action);
                writeln!(self.output, "{action}: storage error, see logs")
            }
            DomainError::Validation(errors) => {
                writeln!(self.output, "{action}:")?;
                for e in errors {
                    writeln!(self.output, "  - {}: {}", e.field, e.message)?;
                }
                Ok(())
            }
            other => writeln!(self.output, "{action}: {other}"),
        }
    }
}

/// Empty input keeps the stored value.
fn text_update(input: String) -> FieldUpdate<String> {
    if input.trim().is_empty() {
        FieldUpdate::Keep
    } else {
        FieldUpdate::Set(input)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use user_server::data::memory_repository::InMemoryUserRepository;
    use user_server::infrastructure::events::LogEventPublisher;

    use super::*;

    async fn run_script(repo: Arc<InMemoryUserRepository>, script: &str) -> String {
        let service = UserService::new(repo, Arc::new(LogEventPublisher));
        let mut console = Console::new(service, script.as_bytes(), Vec::new());
        console.run().await.unwrap();
        String::from_utf8(console.into_output()).unwrap()
    }

    fn seeded(users: Vec<User>) -> Arc<InMemoryUserRepository> {
        Arc::new(InMemoryUserRepository::with_users(users))
    }

    #[tokio::test]
    async fn creates_and_lists_users() {
        let repo = seeded(vec![]);
        let out = run_script(repo.clone(), "1\nIvan\nivan@x.com\n25\n3\n6\n").await;

        assert!(out.contains("User created with ID:"));
        assert!(out.contains("ivan@x.com"));
        assert!(out.contains("Total users: 1"));
        assert!(out.ends_with("Exiting...\n"));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn rejects_non_numeric_age_and_keeps_running() {
        let repo = seeded(vec![]);
        let out = run_script(repo.clone(), "1\nIvan\nivan@x.com\nabc\n3\n").await;

        assert!(out.contains("age must be a number"));
        assert!(out.contains("No users found."));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn reports_duplicate_email_on_create() {
        let repo = seeded(vec![User::new("Dup".into(), "dup@x.com".into(), 20)]);
        let out = run_script(repo.clone(), "1\nOther\ndup@x.com\n30\n6\n").await;

        assert!(out.contains("Could not create user: user with email dup@x.com already exists"));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn update_with_empty_answers_keeps_fields() {
        let user = User::new("Ivan".into(), "ivan@x.com".into(), 25);
        let repo = seeded(vec![user.clone()]);
        let script = format!("4\n{}\n\n\n30\n6\n", user.id);
        let out = run_script(repo.clone(), &script).await;

        assert!(out.contains("User updated."));
        let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Ivan");
        assert_eq!(stored.email, "ivan@x.com");
        assert_eq!(stored.age, 30);
    }

    #[tokio::test]
    async fn update_reports_invalid_age() {
        let user = User::new("Ivan".into(), "ivan@x.com".into(), 25);
        let repo = seeded(vec![user.clone()]);
        let script = format!("4\n{}\n\n\n200\n6\n", user.id);
        let out = run_script(repo.clone(), &script).await;

        assert!(out.contains("Could not update user: age must be between 1 and 150, got 200"));
        assert_eq!(repo.find_by_id(user.id).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let user = User::new("Ivan".into(), "ivan@x.com".into(), 25);
        let repo = seeded(vec![user.clone()]);

        let out = run_script(repo.clone(), &format!("5\n{}\nn\n6\n", user.id)).await;
        assert!(out.contains("Deletion cancelled."));
        assert_eq!(repo.len().await, 1);

        let out = run_script(repo.clone(), &format!("5\n{}\ny\n6\n", user.id)).await;
        assert!(out.contains("User deleted."));
        assert_eq!(repo.len().await, 0);
    }

    #[tokio::test]
    async fn handles_bad_ids_and_choices() {
        let repo = seeded(vec![]);
        let script = format!("2\nnot-a-uuid\n2\n{}\n9\n", Uuid::new_v4());
        let out = run_script(repo, &script).await;

        assert!(out.contains("ID must be a valid UUID"));
        assert!(out.contains("Could not find user: user not found"));
        assert!(out.contains("Invalid choice."));
    }
}
