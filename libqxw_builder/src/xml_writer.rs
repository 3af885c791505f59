use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::path::Path;

use super::config::{Config, VirtualConsoleInfo, WorkspaceInfo};
use super::document::{ChannelGroupElement, CompiledDocument, FixtureElement, UniverseElement};
use super::error::EmitterError;

const WORKSPACE_NAMESPACE: &str = "http://www.qlcplus.org/Workspace";
const DOCUMENT_PROLOGUE: &[u8] = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE Workspace>\n";
const INDENT_SIZE: usize = 2;

// Structure
// Workspace - xmlns, CurrentWindow
// |---- Creator
// |---- Engine
// |    |---- InputOutputMap
// |    |    |---- Universe - Name, ID
// |    |    |    |---- Output - Plugin, Line
// |    |    |    |    |---- PluginParameters - <parameters>
// |    |---- Fixture (Manufacturer, Model, Mode, ID, Name, Universe, Address, Channels)
// |    |---- ChannelsGroup - ID, Name, Value
// |---- VirtualConsole
// |---- SimpleDesk

/// Serializes a [CompiledDocument] into a QLC+ workspace.
///
/// The document is always rendered completely in memory before anything touches the target
/// file, so a failing run never leaves a truncated workspace behind.
#[derive(Debug, Clone)]
pub struct XMLWriter {
    workspace: WorkspaceInfo,
    virtual_console: VirtualConsoleInfo,
}

impl XMLWriter {
    pub fn new(workspace: WorkspaceInfo, virtual_console: VirtualConsoleInfo) -> Self {
        Self {
            workspace,
            virtual_console,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.workspace.clone(), config.virtual_console.clone())
    }

    /// Render the full workspace markup
    pub fn render(&self, doc: &CompiledDocument) -> Result<Vec<u8>, EmitterError> {
        let mut buffer = Vec::from(DOCUMENT_PROLOGUE);
        let mut writer = Writer::new_with_indent(&mut buffer, b' ', INDENT_SIZE);

        writer.write_event(Event::Start(BytesStart::new("Workspace").with_attributes([
            ("xmlns", WORKSPACE_NAMESPACE),
            ("CurrentWindow", self.workspace.current_window.as_str()),
        ])))?;
        self.write_creator(&mut writer)?;
        write_engine(&mut writer, doc)?;
        self.write_virtual_console(&mut writer)?;

        writer.write_event(Event::Start(BytesStart::new("SimpleDesk")))?;
        writer.create_element("Engine").write_empty()?;
        writer.write_event(Event::End(BytesEnd::new("SimpleDesk")))?;

        writer.write_event(Event::End(BytesEnd::new("Workspace")))?;
        buffer.push(b'\n');
        Ok(buffer)
    }

    /// Render and write the workspace to path. Returns the number of bytes written.
    pub fn write(&self, doc: &CompiledDocument, path: &Path) -> Result<u64, EmitterError> {
        let bytes = self.render(doc)?;
        write_rendered(&bytes, path)
    }

    fn write_creator<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), EmitterError> {
        writer.write_event(Event::Start(BytesStart::new("Creator")))?;
        write_text_element(writer, "Name", &self.workspace.creator_name)?;
        write_text_element(writer, "Version", &self.workspace.creator_version)?;
        write_text_element(writer, "Author", &self.workspace.author)?;
        writer.write_event(Event::End(BytesEnd::new("Creator")))?;
        Ok(())
    }

    fn write_virtual_console<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
    ) -> Result<(), EmitterError> {
        let vc = &self.virtual_console;
        writer.write_event(Event::Start(BytesStart::new("VirtualConsole")))?;

        writer.write_event(Event::Start(
            BytesStart::new("Frame").with_attributes([("Caption", "")]),
        ))?;
        writer.write_event(Event::Start(BytesStart::new("Appearance")))?;
        write_text_element(writer, "FrameStyle", "None")?;
        write_text_element(writer, "ForegroundColor", "Default")?;
        write_text_element(writer, "BackgroundColor", &vc.background_color)?;
        write_text_element(writer, "BackgroundImage", "None")?;
        write_text_element(writer, "Font", "Default")?;
        writer.write_event(Event::End(BytesEnd::new("Appearance")))?;
        writer.write_event(Event::End(BytesEnd::new("Frame")))?;

        writer.write_event(Event::Start(BytesStart::new("Properties")))?;
        writer
            .create_element("Size")
            .with_attributes([
                ("Width", vc.width.to_string().as_str()),
                ("Height", vc.height.to_string().as_str()),
            ])
            .write_empty()?;
        writer
            .create_element("GrandMaster")
            .with_attributes([
                ("ChannelMode", vc.grand_master.channel_mode.as_str()),
                ("ValueMode", vc.grand_master.value_mode.as_str()),
                ("SliderMode", vc.grand_master.slider_mode.as_str()),
            ])
            .write_empty()?;
        writer.write_event(Event::End(BytesEnd::new("Properties")))?;

        writer.write_event(Event::End(BytesEnd::new("VirtualConsole")))?;
        Ok(())
    }
}

/// Write already rendered markup to path in a single call
pub fn write_rendered(bytes: &[u8], path: &Path) -> Result<u64, EmitterError> {
    std::fs::write(path, bytes).map_err(|source| EmitterError::BadTarget {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(bytes.len() as u64)
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), EmitterError> {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

fn write_engine<W: std::io::Write>(
    writer: &mut Writer<W>,
    doc: &CompiledDocument,
) -> Result<(), EmitterError> {
    writer.write_event(Event::Start(BytesStart::new("Engine")))?;

    writer.write_event(Event::Start(BytesStart::new("InputOutputMap")))?;
    for universe in doc.universes.iter() {
        write_universe(writer, universe)?;
    }
    writer.write_event(Event::End(BytesEnd::new("InputOutputMap")))?;

    for fixture in doc.fixtures.iter() {
        write_fixture(writer, fixture)?;
    }
    for group in doc.channel_groups.iter() {
        write_channel_group(writer, group)?;
    }

    writer.write_event(Event::End(BytesEnd::new("Engine")))?;
    Ok(())
}

fn write_universe<W: std::io::Write>(
    writer: &mut Writer<W>,
    universe: &UniverseElement,
) -> Result<(), EmitterError> {
    let id = universe.id.to_string();
    let start = BytesStart::new("Universe")
        .with_attributes([("Name", universe.name.as_str()), ("ID", id.as_str())]);

    let Some(output) = &universe.output else {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    };

    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Start(BytesStart::new("Output").with_attributes([
        ("Plugin", output.plugin.as_str()),
        ("Line", output.line.as_str()),
    ])))?;
    writer
        .create_element("PluginParameters")
        .with_attributes(
            output
                .parameters
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        )
        .write_empty()?;
    writer.write_event(Event::End(BytesEnd::new("Output")))?;
    writer.write_event(Event::End(BytesEnd::new("Universe")))?;
    Ok(())
}

fn write_fixture<W: std::io::Write>(
    writer: &mut Writer<W>,
    fixture: &FixtureElement,
) -> Result<(), EmitterError> {
    writer.write_event(Event::Start(BytesStart::new("Fixture")))?;
    write_text_element(writer, "Manufacturer", &fixture.manufacturer)?;
    write_text_element(writer, "Model", &fixture.model)?;
    write_text_element(writer, "Mode", &fixture.mode)?;
    write_text_element(writer, "ID", &fixture.id.to_string())?;
    write_text_element(writer, "Name", &fixture.name)?;
    write_text_element(writer, "Universe", &fixture.universe.to_string())?;
    write_text_element(writer, "Address", &fixture.address.to_string())?;
    write_text_element(writer, "Channels", &fixture.channels.to_string())?;
    writer.write_event(Event::End(BytesEnd::new("Fixture")))?;
    Ok(())
}

fn write_channel_group<W: std::io::Write>(
    writer: &mut Writer<W>,
    group: &ChannelGroupElement,
) -> Result<(), EmitterError> {
    let id = group.id.to_string();
    writer
        .create_element("ChannelsGroup")
        .with_attributes([
            ("ID", id.as_str()),
            ("Name", group.name.as_str()),
            ("Value", "0"),
        ])
        .write_text_content(BytesText::new(&group.value_text()))?;
    Ok(())
}
