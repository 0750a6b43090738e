use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use config::Config;
use error::TodoError;
use render::{render_lists, render_todolist, to_json, Ack};
use service::TodoService;

mod aggregate;
mod cli;
mod config;
mod database;
mod error;
mod logging;
mod model;
mod render;
mod repository;
mod service;
mod tui;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<TodoError>()
                .map_or(1, TodoError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.db.clone())?;

    if cli.command == Command::Tui {
        if cli.debug {
            config.ensure_parent_dir()?;
            logging::init_file_tracing(&config.log_path())?;
        }
    } else {
        logging::init_tracing(cli.debug)?;
    }

    config.ensure_parent_dir()?;
    let conn = database::open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let mut service = TodoService::new(conn);

    let json = cli.json;
    match cli.command {
        Command::Lists => {
            let lists = service.list_todolists()?;
            print(json, &lists, || render_lists(&lists))?;
        }
        Command::CreateList { name } => {
            let list = service.create_todolist(&name)?;
            print(json, &list, || render_todolist(&list))?;
        }
        Command::Show { id } => {
            let list = service.get_todolist(id)?;
            print(json, &list, || render_todolist(&list))?;
        }
        Command::AddItem { list, name, text } => {
            let item = service.create_item(list, &name, &text)?;
            print(json, &item, || render::item_line(&item))?;
        }
        Command::UpdateItem {
            list,
            item,
            name,
            text,
            done,
        } => {
            let item = service.update_item(list, item, &name, &text, done)?;
            print(json, &item, || render::item_line(&item))?;
        }
        Command::DeleteItem { list, item } => {
            service.delete_item(list, item)?;
            let ack = Ack {
                detail: "Item soft deleted",
            };
            print(json, &ack, || ack.detail.to_string())?;
        }
        Command::DeleteList { list } => {
            service.delete_todolist(list)?;
            let ack = Ack {
                detail: "TodoList soft deleted",
            };
            print(json, &ack, || ack.detail.to_string())?;
        }
        Command::Tui => tui::run(&mut service)?,
    }

    Ok(())
}

fn print<T, F>(json: bool, value: &T, text: F) -> Result<()>
where
    T: serde::Serialize + ?Sized,
    F: FnOnce() -> String,
{
    if json {
        println!("{}", to_json(value).context("failed to serialize output")?);
    } else {
        println!("{}", text());
    }
    Ok(())
}
