use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdt_editor::{
    Command, Confirmation, Created, DragPayload, DropTarget, EditorConfig, EditorSession, Outcome,
    SelectionPatch,
};
use pdt_schema::{
    FieldEdit, FieldId, FieldType, Product, ProductDraft, ProductEdit, ProductId, SectionEdit,
    SectionId,
};
use pdt_store::FileBlobStore;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Directory under the workspace root holding config and documents.
const DATA_DIR: &str = ".pdt";
const CONFIG_FILE: &str = "config.json";
const STORE_DIR: &str = "store";
/// Environment variable carrying a tracing filter directive.
const LOG_ENV: &str = "PDT_LOG";

#[derive(Parser)]
#[command(
    name = "pdt-cli",
    about = "Edit product schemas from the command line",
    author,
    version
)]
struct Cli {
    /// 指定工作區根目錄；預設為目前目錄。 / Workspace root (defaults to current directory).
    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,
    /// 輸出除錯記錄。 / Emit debug logs on stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 列出產品。 / List products, optionally filtered by name.
    List {
        #[arg(long)]
        filter: Option<String>,
    },
    /// 顯示產品結構。 / Show the sections and fields of a product.
    Show(ShowArgs),
    /// 列出可用欄位類型。 / List field types offered by the toolbox.
    Palette,
    /// 建立新產品。 / Create a product and open it.
    NewProduct(NewProductArgs),
    /// Rename a product; a blank name becomes "Untitled Product".
    RenameProduct {
        name: String,
        #[arg(long, value_name = "PRODUCT_ID")]
        product: Option<String>,
    },
    /// Open a product in the editor.
    Open { product_id: String },
    /// Highlight a product without leaving the list.
    SelectProduct { product_id: String },
    /// Return to the product list.
    Back,
    /// 變更目前選取的區段或欄位。 / Change the selected section or field.
    Select(SelectArgs),
    /// Append a section to a product.
    AddSection {
        #[arg(long, value_name = "PRODUCT_ID")]
        product: Option<String>,
    },
    /// 新增欄位。 / Add a field to a section (defaults to the selected one).
    AddField {
        #[arg(long, value_name = "SECTION_ID")]
        section: Option<String>,
        #[arg(long = "type", value_name = "TYPE")]
        field_type: Option<String>,
    },
    /// 修改屬性。 / Set a property of a product, section or field.
    Set(SetArgs),
    DeleteSection { section_id: String },
    DeleteField { field_id: String },
    /// 刪除產品（需確認）。 / Delete a product; requires --yes.
    DeleteProduct {
        product_id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Move a field within the open product.
    MoveField {
        field_id: String,
        #[arg(long, value_name = "SECTION_ID")]
        to: String,
        #[arg(long, value_name = "FIELD_ID")]
        before: Option<String>,
    },
    /// 模擬拖放。 / Replay a drop of a raw drag payload.
    Drop(DropArgs),
    /// Write the document to the store.
    Save,
    /// Request a version snapshot.
    SaveVersion,
}

#[derive(Args)]
struct ShowArgs {
    /// 預設為目前選取的產品。 / Defaults to the selected product.
    #[arg(long, value_name = "PRODUCT_ID")]
    product: Option<String>,
    /// Print the product as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct NewProductArgs {
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    category: String,
}

#[derive(Args)]
struct SelectArgs {
    #[arg(long, value_name = "SECTION_ID", conflicts_with = "no_section")]
    section: Option<String>,
    #[arg(long, value_name = "FIELD_ID", conflicts_with = "no_field")]
    field: Option<String>,
    /// Clear the section (and field) selection.
    #[arg(long)]
    no_section: bool,
    /// Clear the field selection.
    #[arg(long)]
    no_field: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Target {
    Product,
    Section,
    Field,
}

#[derive(Args)]
struct SetArgs {
    target: Target,
    property: String,
    value: String,
    /// 預設為目前選取的項目。 / Defaults to the selected entity.
    #[arg(long, value_name = "ID")]
    id: Option<String>,
}

#[derive(Args)]
struct DropArgs {
    /// 拖曳事件的文字內容。 / Text carried by the drag event.
    #[arg(long)]
    payload: String,
    #[arg(long, value_name = "SECTION_ID")]
    section: String,
    /// Drop on this field row instead of the section container.
    #[arg(long, value_name = "FIELD_ID")]
    row: Option<String>,
}

type Session = EditorSession<FileBlobStore>;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        workspace,
        verbose,
        command,
    } = Cli::parse();
    init_tracing(verbose);
    let workspace_root = resolve_workspace(workspace)?;
    let mut session = open_session(&workspace_root)?;
    match command {
        Commands::List { filter } => print_list(&session, filter.as_deref().unwrap_or("")),
        Commands::Show(args) => execute_show(&session, args),
        Commands::Palette => {
            for kind in &session.config().palette {
                println!("{kind}");
            }
            Ok(())
        }
        command => {
            let command = build_command(&session, command)?;
            let outcome = session.apply(command)?;
            report(&outcome);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => {
            if path.is_absolute() {
                Ok(path)
            } else {
                Ok(std::env::current_dir()
                    .context("determine current directory")?
                    .join(path))
            }
        }
        None => std::env::current_dir().context("determine current directory"),
    }
}

fn open_session(workspace_root: &Path) -> Result<Session> {
    let data_dir = workspace_root.join(DATA_DIR);
    let config_path = data_dir.join(CONFIG_FILE);
    let config = EditorConfig::load(&config_path)
        .with_context(|| format!("load editor config {}", config_path.display()))?;
    debug!(path = %config_path.display(), key = %config.storage_key, "editor config loaded");
    let blobs = FileBlobStore::new(data_dir.join(STORE_DIR));
    EditorSession::open(blobs, config).context("open product document")
}

fn build_command(session: &Session, command: Commands) -> Result<Command> {
    let command = match command {
        Commands::NewProduct(args) => Command::CreateProduct(ProductDraft::new(
            args.name,
            args.description,
            args.category,
        )),
        Commands::RenameProduct { name, product } => Command::RenameProduct {
            product_id: product_or_selected(session, product)?,
            name,
        },
        Commands::Open { product_id } => Command::OpenProduct {
            product_id: ProductId::new(product_id),
        },
        Commands::SelectProduct { product_id } => Command::SelectProduct {
            product_id: ProductId::new(product_id),
        },
        Commands::Back => Command::BackToList,
        Commands::Select(args) => Command::Select(selection_patch(args)?),
        Commands::AddSection { product } => Command::AddSection {
            product_id: product_or_selected(session, product)?,
        },
        Commands::AddField {
            section,
            field_type,
        } => {
            let field_type = resolve_field_type(session, field_type)?;
            match section {
                Some(section) => Command::AddField {
                    section_id: SectionId::new(section),
                    field_type,
                },
                None => Command::AddFieldToSelection { field_type },
            }
        }
        Commands::Set(args) => set_command(session, args)?,
        Commands::DeleteSection { section_id } => Command::DeleteSection {
            section_id: SectionId::new(section_id),
        },
        Commands::DeleteField { field_id } => Command::DeleteField {
            field_id: FieldId::new(field_id),
        },
        Commands::DeleteProduct { product_id, yes } => Command::DeleteProduct {
            product_id: ProductId::new(product_id),
            confirmation: Confirmation::from(yes),
        },
        Commands::MoveField { field_id, to, before } => Command::MoveField {
            field_id: FieldId::new(field_id),
            to_section: SectionId::new(to),
            before: before.map(FieldId::new),
        },
        Commands::Drop(args) => {
            let section_id = SectionId::new(args.section);
            let target = match args.row {
                Some(row) => DropTarget::Row {
                    section_id,
                    field_id: FieldId::new(row),
                },
                None => DropTarget::Section(section_id),
            };
            if DragPayload::parse(&args.payload).is_none() {
                debug!(payload = %args.payload, "payload not recognised; drop will be ignored");
            }
            Command::Drop {
                target,
                data: Some(args.payload),
            }
        }
        Commands::Save => Command::Save,
        Commands::SaveVersion => Command::SaveVersion,
        Commands::List { .. } | Commands::Show(_) | Commands::Palette => {
            bail!("read-only command routed to the editor")
        }
    };
    Ok(command)
}

fn product_or_selected(session: &Session, product: Option<String>) -> Result<ProductId> {
    match product {
        Some(id) => Ok(ProductId::new(id)),
        None => session
            .selection()
            .product
            .clone()
            .ok_or_else(|| anyhow!("no product selected; pass --product")),
    }
}

fn selection_patch(args: SelectArgs) -> Result<SelectionPatch> {
    let mut patch = SelectionPatch::new();
    if args.no_section {
        patch = patch.section(None).field(None);
    } else if let Some(section) = args.section {
        patch = patch.section(Some(SectionId::new(section)));
    }
    if args.no_field {
        patch = patch.field(None);
    } else if let Some(field) = args.field {
        patch = patch.field(Some(FieldId::new(field)));
    }
    if patch.is_empty() {
        bail!("nothing to select; pass --section, --field, --no-section or --no-field");
    }
    Ok(patch)
}

/// Matches `requested` against the palette case-insensitively and returns the
/// palette's spelling.
fn resolve_field_type(session: &Session, requested: Option<String>) -> Result<FieldType> {
    let config = session.config();
    let Some(requested) = requested else {
        return Ok(config.default_field_type.clone());
    };
    config
        .palette
        .iter()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(requested.trim()))
        .cloned()
        .ok_or_else(|| anyhow!("unknown field type '{requested}'; see `pdt-cli palette`"))
}

fn set_command(session: &Session, args: SetArgs) -> Result<Command> {
    let selection = session.selection();
    let command = match args.target {
        Target::Product => Command::EditProduct {
            product_id: args
                .id
                .map(ProductId::new)
                .or_else(|| selection.product.clone())
                .ok_or_else(|| anyhow!("no product selected; pass --id"))?,
            edit: ProductEdit::from_property(&args.property, args.value)?,
        },
        Target::Section => Command::EditSection {
            section_id: args
                .id
                .map(SectionId::new)
                .or_else(|| selection.section.clone())
                .ok_or_else(|| anyhow!("no section selected; pass --id"))?,
            edit: SectionEdit::from_property(&args.property, args.value)?,
        },
        Target::Field => Command::EditField {
            field_id: args
                .id
                .map(FieldId::new)
                .or_else(|| selection.field.clone())
                .ok_or_else(|| anyhow!("no field selected; pass --id"))?,
            edit: FieldEdit::from_property(&args.property, args.value)?,
        },
    };
    Ok(command)
}

fn print_list(session: &Session, filter: &str) -> Result<()> {
    let view = session.view(filter);
    if view.list_is_empty() {
        println!("No products match.");
        return Ok(());
    }
    for summary in &view.products {
        let product = summary.product;
        let marker = if summary.is_active { '*' } else { ' ' };
        println!(
            "{marker} {}  {}  [{} / {}]  {} section(s), {} field(s)",
            product.id,
            product.name,
            product.category,
            product.status,
            product.sections.len(),
            product.field_count()
        );
    }
    Ok(())
}

fn execute_show(session: &Session, args: ShowArgs) -> Result<()> {
    let view = session.view("");
    let product = match args.product {
        Some(id) => session
            .catalog()
            .product(&ProductId::new(id.clone()))
            .ok_or_else(|| anyhow!("product '{id}' not found"))?,
        None => view
            .editing
            .product
            .ok_or_else(|| anyhow!("no product selected; pass --product"))?,
    };
    if args.json {
        let rendered =
            serde_json::to_string_pretty(product).context("serialize product to JSON")?;
        println!("{rendered}");
        return Ok(());
    }
    println!("view: {}", view.mode.as_str());
    print_product(product, session);
    Ok(())
}

fn print_product(product: &Product, session: &Session) {
    let selection = session.selection();
    println!("{} ({})", product.name, product.id);
    println!("  category: {}  status: {}", product.category, product.status);
    if !product.description.is_empty() {
        println!("  {}", product.description);
    }
    for section in &product.sections {
        let marker = if selection.section.as_ref() == Some(&section.id) {
            '>'
        } else {
            ' '
        };
        println!("{marker} {} ({})", section.title, section.id);
        if section.fields.is_empty() {
            println!("      (no fields)");
        }
        for field in &section.fields {
            let marker = if selection.field.as_ref() == Some(&field.id) {
                '*'
            } else {
                ' '
            };
            let required = if field.required { "  required" } else { "" };
            println!(
                "    {marker} {}  {}  {}{required}  ({})",
                field.label, field.key, field.field_type, field.id
            );
        }
    }
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Unchanged => println!("Nothing changed."),
        Outcome::Updated => println!("Updated."),
        Outcome::Created(Created::Product(id)) => println!("Created product {id}"),
        Outcome::Created(Created::Section(id)) => println!("Created section {id}"),
        Outcome::Created(Created::Field(id)) => println!("Created field {id}"),
        Outcome::Moved(moved) => println!(
            "Moved {} from {}[{}] to {}[{}]",
            moved.field_id, moved.from_section, moved.from_index, moved.to_section, moved.to_index
        ),
        Outcome::Deleted => println!("Deleted."),
        Outcome::Declined => println!("Not confirmed; pass --yes to delete."),
        Outcome::Saved => println!("Saved."),
        Outcome::Notice(message) => println!("{message}"),
    }
}
