use core::convert::Infallible;

use embedded_graphics::{
    Drawable, Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    mono_font::{MonoTextStyle, ascii::FONT_6X10},
    pixelcolor::BinaryColor,
    prelude::Primitive,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};
use folio_core::render::{self, DrawCommand, Frame, Orientation, RectStyle, ScreenSink};
use gdeh029a1::{FrameBuffer, Gdeh029a1, Rotation};
use log::debug;

/// Integer pixel scaling in front of another draw target, anchored at `offset`.
struct Scaled<'a, T> {
    target: &'a mut T,
    offset: Point,
    factor: u32,
}

impl<T> DrawTarget for Scaled<'_, T>
where
    T: DrawTarget<Color = BinaryColor, Error = Infallible>,
{
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let factor = self.factor as i32;
        for Pixel(point, color) in pixels {
            let origin = self.offset + Point::new(point.x * factor, point.y * factor);
            self.target
                .fill_solid(&Rectangle::new(origin, Size::new(self.factor, self.factor)), color)?;
        }
        Ok(())
    }
}

impl<T> OriginDimensions for Scaled<'_, T>
where
    T: OriginDimensions,
{
    fn size(&self) -> Size {
        let size = self.target.size();
        Size::new(size.width / self.factor, size.height / self.factor)
    }
}

/// GDEH029A1 panel behind the reader's `ScreenSink` seam.
///
/// Frames are rasterized into a local framebuffer and pushed to the panel
/// with a full refresh on `Refresh`. The controller is put into deep sleep
/// after every refresh, so the panel is already parked whenever the MCU
/// sleeps; the next frame re-initializes it.
pub struct EpdScreen<SPI, DC, RST, BUSY, D> {
    epd: Gdeh029a1<SPI, DC, RST, BUSY>,
    delay: D,
    frame: FrameBuffer,
}

impl<SPI, DC, RST, BUSY, D, PinErr> EpdScreen<SPI, DC, RST, BUSY, D>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    D: DelayNs,
{
    pub fn new(epd: Gdeh029a1<SPI, DC, RST, BUSY>, delay: D) -> Self {
        Self {
            epd,
            delay,
            frame: FrameBuffer::new(),
        }
    }

    fn draw_text(&mut self, origin: render::Point, size: u8, inverted: bool, text: &str) {
        let color = if inverted {
            BinaryColor::Off
        } else {
            BinaryColor::On
        };
        let style = MonoTextStyle::new(&FONT_6X10, color);

        if size <= 1 {
            let position = Point::new(origin.x, origin.y);
            let _ = Text::with_baseline(text, position, style, Baseline::Top).draw(&mut self.frame);
            return;
        }

        let mut scaled = Scaled {
            target: &mut self.frame,
            offset: Point::new(origin.x, origin.y),
            factor: size as u32,
        };
        let _ = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut scaled);
    }

    fn draw_rect(&mut self, origin: render::Point, width: u16, height: u16, style: RectStyle) {
        let style = match style {
            RectStyle::Outline => PrimitiveStyle::with_stroke(BinaryColor::On, 1),
            RectStyle::Filled => PrimitiveStyle::with_fill(BinaryColor::On),
        };
        let _ = Rectangle::new(
            Point::new(origin.x, origin.y),
            Size::new(width as u32, height as u32),
        )
        .into_styled(style)
        .draw(&mut self.frame);
    }
}

impl<SPI, DC, RST, BUSY, D, PinErr> ScreenSink for EpdScreen<SPI, DC, RST, BUSY, D>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    D: DelayNs,
    PinErr: core::fmt::Debug,
{
    type Error = gdeh029a1::Error<SPI::Error, PinErr>;

    fn draw(&mut self, frame: &Frame<'_>) -> Result<(), Self::Error> {
        self.frame.set_rotation(match frame.orientation {
            Orientation::Portrait => Rotation::Rotate0,
            Orientation::Landscape => Rotation::Rotate90,
        });

        for command in &frame.commands {
            match command {
                DrawCommand::Clear => self.frame.clear(false),
                DrawCommand::Text {
                    origin,
                    size,
                    inverted,
                    text,
                } => self.draw_text(*origin, *size, *inverted, text.as_str()),
                DrawCommand::Rect {
                    origin,
                    width,
                    height,
                    style,
                } => self.draw_rect(*origin, *width, *height, *style),
                DrawCommand::Refresh => {
                    debug!("display: refresh commands={}", frame.commands.len());
                    self.epd.display(&self.frame, &mut self.delay)?;
                    self.epd.sleep()?;
                }
            }
        }

        Ok(())
    }
}
