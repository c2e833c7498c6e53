//! Renders the badge through the public API and checks what reaches the panel.

use overglade_badge::badge::BadgeRenderer;
use overglade_badge::canvas::{Color, FramePair};
use overglade_badge::config::Config;
use overglade_badge::display::epd2in66::{HEIGHT, WIDTH, cmd, row_bytes};
use overglade_badge::display::{
    BusError, ControllerState, DisplayBus, Epd2in66, RefreshMode, WaveformLut, landscape_to_native,
};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

/// Bus that keeps every command with the data written after it
#[derive(Default)]
struct CaptureBus {
    frames: Vec<(u8, Vec<u8>)>,
}

impl CaptureBus {
    fn last_data_for(&self, command: u8) -> Option<&[u8]> {
        self.frames
            .iter()
            .rev()
            .find(|(c, _)| *c == command)
            .map(|(_, data)| data.as_slice())
    }
}

impl DisplayBus for CaptureBus {
    fn reset(&mut self) -> Result<(), BusError> {
        Ok(())
    }

    fn send_command(&mut self, command: u8) -> Result<(), BusError> {
        self.frames.push((command, Vec::new()));
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), BusError> {
        if let Some((_, buf)) = self.frames.last_mut() {
            buf.extend_from_slice(data);
        }
        Ok(())
    }

    fn wait_until_idle(&mut self) -> Result<(), BusError> {
        Ok(())
    }
}

fn config_from(json: &str) -> Config {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    Config::load(file.path()).unwrap()
}

fn show(config: &Config, assets: &TempDir) -> (FramePair, Epd2in66<CaptureBus>) {
    let mut epd = Epd2in66::new(CaptureBus::default(), WaveformLut::default());
    epd.init(RefreshMode::Full).unwrap();

    let mut frames = FramePair::new(WIDTH as u32, HEIGHT as u32);
    BadgeRenderer::new(assets.path()).render(&mut frames.landscape, config.identity().as_ref());
    epd.display_landscape(frames.landscape.as_bytes()).unwrap();
    (frames, epd)
}

#[test]
fn configured_badge_reaches_panel_ram() {
    let config = config_from(
        r#"{"userName": "Ada", "userPronouns": "she/her", "userHandle": "ada", "partyNumber": 3, "nameScale": 2}"#,
    );
    let assets = TempDir::new().unwrap();
    let (frames, epd) = show(&config, &assets);

    let ram = epd.bus().last_data_for(cmd::WRITE_RAM).unwrap();
    let stride = row_bytes(WIDTH);
    assert_eq!(ram.len(), stride * HEIGHT as usize);
    assert_eq!(ram, landscape_to_native(frames.landscape.as_bytes(), stride, HEIGHT as usize).as_slice());

    // Frame corner (10, 20): native row 10, byte 18 - 20 / 8, bit 20 % 8
    assert_eq!(frames.landscape.pixel(10, 20), Some(Color::Ink));
    assert_eq!(ram[10 * stride + (stride - 1 - 20 / 8)] & (1 << (20 % 8)), 0);

    assert_eq!(epd.state(), ControllerState::Idle(RefreshMode::Full));
}

#[test]
fn unconfigured_badge_shows_notice() {
    let config = config_from(r#"{"userName": "Ada"}"#);
    let assets = TempDir::new().unwrap();
    let (frames, mut epd) = show(&config, &assets);

    assert_eq!(frames.landscape.pixel(10, 20), Some(Color::Background));
    let inked = (13..29).any(|y| (10..218).any(|x| frames.landscape.pixel(x, y) == Some(Color::Ink)));
    assert!(inked);

    epd.sleep().unwrap();
    assert_eq!(epd.state(), ControllerState::Sleeping);
    assert_eq!(epd.bus().frames.last().map(|(c, _)| *c), Some(cmd::DEEP_SLEEP));
}

#[test]
fn fitted_text_fills_the_landscape_screen() {
    let assets = TempDir::new().unwrap();
    let mut frames = FramePair::new(WIDTH as u32, HEIGHT as u32);
    let block = BadgeRenderer::new(assets.path()).render_text(&mut frames.landscape, "Hello badge");

    assert_eq!(block.lines, vec!["Hello".to_string(), "badge".to_string()]);
    assert_eq!(block.scale, 7);
    assert!(frames.portrait.as_bytes().iter().all(|&b| b == 0));
}
