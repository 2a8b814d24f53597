//! Interactive entry loop.
//!
//! Each input line is the text of the focused field followed by Enter, so the
//! fields are filled in order and Enter on the last one adds the item. Lines
//! starting with `:` are commands. Scanner reports are drained before and
//! after every line read, never while an add is running.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use stocktally_inventory::{
    BarcodeScanner, EXPORT_FILE_NAME, EnterOutcome, EntryForm, InventoryStore, KeyValueStorage,
    ScanOutcome, ScanSession, ViewProjector,
};
use thiserror::Error;

use crate::prompt::LineConfirm;
use crate::render;

const HELP: &str = "\
Digite o valor de cada campo e pressione Enter; Enter no último campo adiciona o item.
Comandos: :list  :rm N  :clear  :export [ARQUIVO]  :scan  :stop  :help  :quit";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShellCommandError {
    #[error("comando desconhecido: :{0} (use :help)")]
    Unknown(String),

    #[error("índice inválido: {0}")]
    InvalidIndex(String),

    #[error("uso: {0}")]
    Usage(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Remove(usize),
    Clear,
    Export(Option<PathBuf>),
    Scan,
    Stop,
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = ShellCommandError;

    /// Parse the text after the leading `:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        match name {
            "list" | "ls" => Ok(ShellCommand::List),
            "rm" | "remove" => {
                let raw = arg.ok_or(ShellCommandError::Usage(":rm N"))?;
                raw.parse()
                    .map(ShellCommand::Remove)
                    .map_err(|_| ShellCommandError::InvalidIndex(raw.to_string()))
            }
            "clear" => Ok(ShellCommand::Clear),
            "export" => Ok(ShellCommand::Export(arg.map(PathBuf::from))),
            "scan" => Ok(ShellCommand::Scan),
            "stop" => Ok(ShellCommand::Stop),
            "help" | "h" | "?" => Ok(ShellCommand::Help),
            "quit" | "q" | "exit" => Ok(ShellCommand::Quit),
            other => Err(ShellCommandError::Unknown(other.to_string())),
        }
    }
}

pub struct Shell<'a, S, B> {
    store: &'a mut InventoryStore<S>,
    projector: ViewProjector,
    form: EntryForm,
    scanner: Option<ScanSession<B>>,
}

impl<'a, S: KeyValueStorage, B: BarcodeScanner> Shell<'a, S, B> {
    pub fn new(store: &'a mut InventoryStore<S>, scanner: Option<B>) -> Self {
        let schema = *store.schema();
        Self {
            store,
            projector: ViewProjector::new(schema),
            form: EntryForm::new(schema),
            scanner: scanner.map(ScanSession::new),
        }
    }

    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> anyhow::Result<()> {
        writeln!(out, "{HELP}")?;

        let mut line = String::new();
        loop {
            let mut captured = self.drain_scans(out)?;
            write!(out, "{}> ", self.focused_header())?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }
            captured |= self.drain_scans(out)?;
            let text = line.trim_end_matches(['\r', '\n']);

            if let Some(command) = text.strip_prefix(':') {
                match command.parse::<ShellCommand>() {
                    Ok(ShellCommand::Quit) => break,
                    Ok(command) => self.execute(command, &mut input, out)?,
                    Err(err) => writeln!(out, "{err}")?,
                }
                continue;
            }

            // An empty line right after a scan only refreshes the prompt.
            if captured && text.trim().is_empty() {
                continue;
            }

            self.form.input(text);
            if self.form.press_enter() == EnterOutcome::Submit {
                self.submit(out)?;
            }
        }

        if let Some(session) = self.scanner.as_mut() {
            session.stop();
        }
        Ok(())
    }

    fn focused_header(&self) -> &'static str {
        let key = self.form.focused();
        self.form
            .schema()
            .fields()
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.header)
            .unwrap_or_default()
    }

    fn submit<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        match self.form.submit(&mut *self.store) {
            Ok(item) => writeln!(
                out,
                "Adicionado #{}: {}",
                self.store.len() - 1,
                item.label()
            ),
            Err(_) => writeln!(out, "{}", self.form.status().unwrap_or_default()),
        }
    }

    fn execute<R: BufRead, W: Write>(
        &mut self,
        command: ShellCommand,
        input: &mut R,
        out: &mut W,
    ) -> io::Result<()> {
        match command {
            ShellCommand::List => {
                if self.store.is_empty() {
                    writeln!(out, "(nenhum item)")
                } else {
                    let rows = self.projector.to_rows(self.store.list());
                    write!(out, "{}", render::table(&self.projector.headers(), &rows))
                }
            }
            ShellCommand::Remove(index) => match self.store.remove_at(index) {
                Ok(item) => writeln!(out, "Removido #{index}: {}", item.label()),
                Err(err) => writeln!(out, "{err}"),
            },
            ShellCommand::Clear => {
                let mut confirm = LineConfirm::new(&mut *input, &mut *out);
                match self.store.clear(&mut confirm) {
                    Ok(true) => writeln!(out, "Inventário limpo."),
                    Ok(false) => Ok(()),
                    Err(err) => writeln!(out, "{err}"),
                }
            }
            ShellCommand::Export(path) => {
                let doc = match self.projector.to_csv(self.store.list()) {
                    Ok(doc) => doc,
                    Err(err) => return writeln!(out, "{err}"),
                };
                let path = path.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
                match std::fs::write(&path, doc.as_bytes()) {
                    Ok(()) => writeln!(
                        out,
                        "Exportados {} itens para {}",
                        doc.record_count(),
                        path.display()
                    ),
                    Err(err) => {
                        tracing::error!(path = %path.display(), error = %err, "csv export failed");
                        writeln!(out, "falha ao exportar para {}: {err}", path.display())
                    }
                }
            }
            ShellCommand::Scan => match self.scanner.as_mut() {
                Some(session) => match session.start() {
                    Ok(()) => {
                        self.form.scanner_started();
                        writeln!(out, "{}", self.form.status().unwrap_or_default())
                    }
                    Err(err) => writeln!(out, "Erro na leitura: {err}"),
                },
                None => writeln!(out, "nenhum leitor configurado (use --scan-device)"),
            },
            ShellCommand::Stop => {
                if let Some(session) = self.scanner.as_mut() {
                    session.stop();
                }
                self.form.scanner_stopped();
                Ok(())
            }
            ShellCommand::Help => writeln!(out, "{HELP}"),
            ShellCommand::Quit => Ok(()),
        }
    }

    /// Apply pending scanner reports. Returns whether a code was captured.
    fn drain_scans<W: Write>(&mut self, out: &mut W) -> io::Result<bool> {
        let Some(session) = self.scanner.as_mut() else {
            return Ok(false);
        };

        let mut captured = false;
        while let Some(event) = session.poll() {
            let outcome = self.form.apply_scan(event);
            if outcome == ScanOutcome::Ignored {
                continue;
            }
            writeln!(out, "{}", self.form.status().unwrap_or_default())?;

            if let ScanOutcome::CodeCaptured(_) = outcome {
                session.stop();
                self.form.scanner_stopped();
                captured = true;
            }
        }
        Ok(captured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::Sender;
    use std::io::Cursor;
    use stocktally_inventory::{InMemoryStorage, ScanError, ScanEvent, Variant};

    use crate::scanner::ReaderScanner;

    /// Delivers a fixed script synchronously on start and keeps the channel open.
    #[derive(Default)]
    struct ScriptedScanner {
        script: Vec<ScanEvent>,
        sender: Option<Sender<ScanEvent>>,
    }

    impl BarcodeScanner for ScriptedScanner {
        fn start(&mut self, results: Sender<ScanEvent>) -> Result<(), ScanError> {
            for event in self.script.drain(..) {
                let _ = results.send(event);
            }
            self.sender = Some(results);
            Ok(())
        }

        fn stop(&mut self) {
            self.sender = None;
        }

        fn is_running(&self) -> bool {
            self.sender.is_some()
        }
    }

    fn run_shell<B: BarcodeScanner>(
        store: &mut InventoryStore<&InMemoryStorage>,
        scanner: Option<B>,
        script: &str,
    ) -> String {
        let mut out = Vec::new();
        Shell::new(store, scanner)
            .run(Cursor::new(script.to_string()), &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!("list".parse::<ShellCommand>(), Ok(ShellCommand::List));
        assert_eq!("rm 3".parse::<ShellCommand>(), Ok(ShellCommand::Remove(3)));
        assert_eq!(
            "export out.csv".parse::<ShellCommand>(),
            Ok(ShellCommand::Export(Some(PathBuf::from("out.csv"))))
        );
        assert_eq!(
            "rm".parse::<ShellCommand>(),
            Err(ShellCommandError::Usage(":rm N"))
        );
        assert_eq!(
            "rm x".parse::<ShellCommand>(),
            Err(ShellCommandError::InvalidIndex("x".to_string()))
        );
        assert!(matches!(
            "frobnicate".parse::<ShellCommand>(),
            Err(ShellCommandError::Unknown(_))
        ));
    }

    #[test]
    fn lines_fill_fields_and_enter_on_last_adds() {
        let storage = InMemoryStorage::new();
        let mut store = InventoryStore::load(&storage, Variant::CodeOnly.schema());

        let output = run_shell::<ReaderScanner>(
            &mut store,
            None,
            "A1\n2\n3\n4\nB2\n\n\n\n:list\n:quit\n",
        );

        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[1].pallets.get(), 0);
        assert!(output.contains("Adicionado #0: A1"));
        assert!(output.contains("Adicionado #1: B2"));
        assert!(output.contains("0  A1      2        3              4"));
    }

    #[test]
    fn missing_code_is_reported_and_nothing_added() {
        let storage = InMemoryStorage::new();
        let mut store = InventoryStore::load(&storage, Variant::CodeOnly.schema());

        let output = run_shell::<ReaderScanner>(&mut store, None, "\n1\n1\n1\n");

        assert!(store.is_empty());
        assert!(output.contains("Por favor, preencha o Código do Item."));
    }

    #[test]
    fn remove_and_clear_commands() {
        let storage = InMemoryStorage::new();
        let mut store = InventoryStore::load(&storage, Variant::CodeOnly.schema());

        let output = run_shell::<ReaderScanner>(
            &mut store,
            None,
            "X\n\n\n\nY\n\n\n\nZ\n\n\n\n:rm 1\n:rm 9\n:clear\nn\n",
        );
        let codes: Vec<&str> = store.list().iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["X", "Z"]);
        assert!(output.contains("Removido #1: Y"));
        assert!(output.contains("index 9 is out of range"));

        run_shell::<ReaderScanner>(&mut store, None, ":clear\ns\n");
        assert!(store.is_empty());
    }

    #[test]
    fn export_on_empty_list_reports() {
        let storage = InMemoryStorage::new();
        let mut store = InventoryStore::load(&storage, Variant::CodeOnly.schema());

        let output = run_shell::<ReaderScanner>(&mut store, None, ":export\n");
        assert!(output.contains("Não há itens para exportar."));
    }

    #[test]
    fn export_writes_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("contagem.csv");
        let storage = InMemoryStorage::new();
        let mut store = InventoryStore::load(&storage, Variant::CodeOnly.schema());

        let script = format!("A1\n2\n3\n4\n:export {}\n", target.display());
        let output = run_shell::<ReaderScanner>(&mut store, None, &script);

        assert!(output.contains("Exportados 1 itens"));
        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            "Código,Paletes,Caixas/Palete,Unidades/Caixa\nA1,2,3,4\n"
        );
    }

    #[test]
    fn scanned_code_fills_code_field() {
        let storage = InMemoryStorage::new();
        let mut store = InventoryStore::load(&storage, Variant::CodeOnly.schema());
        let scanner = ScriptedScanner {
            script: vec![
                Err(ScanError::NotFound),
                Err(ScanError::device("lens dirty")),
                Ok("7891000100103".to_string()),
            ],
            ..Default::default()
        };

        let output = run_shell(&mut store, Some(scanner), ":scan\n\n5\n6\n7\n");

        assert!(output.contains("Aguardando leitura..."));
        assert!(output.contains("Erro na leitura: lens dirty"));
        assert!(output.contains("Código lido: 7891000100103"));
        assert_eq!(store.len(), 1);
        let item = &store.list()[0];
        assert_eq!(item.code, "7891000100103");
        assert_eq!(
            (item.pallets.get(), item.boxes_per_pallet.get(), item.units_per_box.get()),
            (5, 6, 7)
        );
    }

    #[test]
    fn scan_without_device_is_explained() {
        let storage = InMemoryStorage::new();
        let mut store = InventoryStore::load(&storage, Variant::CodeOnly.schema());

        let output = run_shell::<ReaderScanner>(&mut store, None, ":scan\n");
        assert!(output.contains("nenhum leitor configurado"));
    }
}
