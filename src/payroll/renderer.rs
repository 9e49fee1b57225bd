//! Fixed-layout pay slip rendering.
//!
//! Rendering happens in two steps. [`layout`] places every mark at an absolute position
//! on an A4 page (top-left origin, points), independent of the text it carries. [`encode_pdf`]
//! then turns those marks into a single-page PDF using the standard Type1 fonts.

use chrono::NaiveDate;
use derive_more::Display;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

use super::calculator::{Deductions, Earnings, PayrollTotals, format_amount, format_days};
use super::metrics::text_width;
use crate::model::employee::Employee;

pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;

const PLACEHOLDER: &str = "N/A";

const ORGANIZATION: [&str; 4] = [
    "PROMARK TECHSOLUTIONS PRIVATE LIMITED",
    "Regd Office: NH-95, Morinda By-Pass, Village Baddi Madouli, Morinda, Distt Ropar-140413 Punjab",
    "E-mail: info@promark.co.in | Website: www.promark.co.in",
    "CIN: U36109PB2010PTC034337 | GST: 03AAFCP7669C1ZF | PAN: AAFCP7669C",
];
const FOOTER: [&str; 2] = [
    "This is a system-generated document. For queries, contact HR at hr@promark.co.in.",
    "(c) Promark Techsolutions Pvt. Ltd. All rights reserved.",
];

const MARGIN: f32 = 40.0;
const RIGHT_EDGE: f32 = 555.0;
const DETAILS_RIGHT_X: f32 = 320.0;
const TABLE_TOP: f32 = 225.0;
const ROW_HEIGHT: f32 = 15.0;
const FIRST_ROW: f32 = TABLE_TOP + 40.0;

const EARNING_LABEL_X: f32 = MARGIN + 5.0;
const EARNING_AMOUNT_X: f32 = MARGIN + 180.0;
const EARNING_AMOUNT_WIDTH: f32 = 70.0;
const DEDUCTION_COLUMN_X: f32 = EARNING_AMOUNT_X + EARNING_AMOUNT_WIDTH;
const DEDUCTION_LABEL_X: f32 = DEDUCTION_COLUMN_X + 5.0;
const DEDUCTION_AMOUNT_X: f32 = DEDUCTION_COLUMN_X + 190.0;
const DEDUCTION_AMOUNT_WIDTH: f32 = 75.0;

const ROW_LINES: [f32; 10] = [15.0, 35.0, 50.0, 65.0, 80.0, 95.0, 110.0, 125.0, 140.0, 155.0];
const COLUMN_LINES: [f32; 5] = [
    MARGIN,
    EARNING_AMOUNT_X,
    DEDUCTION_COLUMN_X,
    DEDUCTION_AMOUNT_X,
    RIGHT_EDGE,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    TimesBold,
}

impl Font {
    const ALL: [Font; 4] = [
        Font::Helvetica,
        Font::HelveticaBold,
        Font::HelveticaOblique,
        Font::TimesBold,
    ];

    fn resource(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
            Font::HelveticaOblique => "F3",
            Font::TimesBold => "F4",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
            Font::HelveticaOblique => "Helvetica-Oblique",
            Font::TimesBold => "Times-Bold",
        }
    }

    /// Ascender height in 1/1000 em, used to move from line top to baseline.
    fn ascent(self) -> f32 {
        match self {
            Font::TimesBold => 683.0,
            _ => 718.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub f32, pub f32, pub f32);

const PRIMARY: Color = Color(0.0, 0.188, 0.529);
const ACCENT: Color = Color(0.294, 0.369, 0.667);
const TEXT: Color = Color(0.102, 0.125, 0.173);
const BORDER: Color = Color(0.820, 0.835, 0.859);
// ACCENT at 5% over white.
const TABLE_TINT: Color = Color(0.965, 0.968, 0.983);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A drawing instruction with absolute geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Text {
        x: f32,
        y: f32,
        width: f32,
        align: Align,
        font: Font,
        size: f32,
        color: Color,
        content: String,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Color,
    },
    Fill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
}

impl Mark {
    /// The mark with its text removed, leaving only geometry and styling.
    pub fn skeleton(&self) -> Mark {
        let mut mark = self.clone();
        if let Mark::Text { content, .. } = &mut mark {
            content.clear();
        }
        mark
    }
}

/// Employee identity as printed on the slip. Missing values print as `N/A`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlipIdentity {
    pub employee_code: Option<String>,
    pub name: String,
    pub pan: Option<String>,
    pub national_id: Option<String>,
    pub join_date: Option<NaiveDate>,
    pub designation: Option<String>,
}

impl From<&Employee> for SlipIdentity {
    fn from(employee: &Employee) -> Self {
        Self {
            employee_code: Some(employee.employee_code.clone()),
            name: employee.username.clone(),
            pan: employee.pan.clone(),
            national_id: employee.adhaar.clone(),
            join_date: employee.join_date,
            designation: employee.designation.clone(),
        }
    }
}

/// Everything printed on one slip.
#[derive(Debug, Clone, PartialEq)]
pub struct SlipSheet {
    pub identity: SlipIdentity,
    pub month: String,
    pub days_worked: f64,
    pub earnings: Earnings,
    pub deductions: Deductions,
    pub totals: PayrollTotals,
}

#[derive(Debug, Clone)]
pub struct RenderedSlip {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Display)]
pub enum RenderError {
    #[display(fmt = "failed to encode pay slip: {}", _0)]
    Encode(String),
}

fn or_placeholder(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => PLACEHOLDER,
    }
}

fn file_component(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `{username}_{month}.pdf`, whitespace runs replaced by `_` and anything outside
/// `[A-Za-z0-9_-]` replaced as well so the name never escapes the artifact directory.
pub fn slip_file_name(username: &str, month: &str) -> String {
    format!("{}_{}.pdf", file_component(username), file_component(month))
}

struct Canvas {
    marks: Vec<Mark>,
}

impl Canvas {
    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        content: impl Into<String>,
        x: f32,
        y: f32,
        width: f32,
        align: Align,
        font: Font,
        size: f32,
        color: Color,
    ) {
        self.marks.push(Mark::Text {
            x,
            y,
            width,
            align,
            font,
            size,
            color,
            content: content.into(),
        });
    }

    fn centered(&mut self, content: impl Into<String>, y: f32, font: Font, size: f32, color: Color) {
        self.text(content, 0.0, y, PAGE_WIDTH, Align::Center, font, size, color);
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Color) {
        self.marks.push(Mark::Line {
            from,
            to,
            width,
            color,
        });
    }
}

pub fn layout(sheet: &SlipSheet) -> Vec<Mark> {
    let mut canvas = Canvas { marks: Vec::new() };

    // Letterhead
    canvas.centered("PAY SLIP", 30.0, Font::TimesBold, 16.0, PRIMARY);
    for (i, line) in ORGANIZATION.iter().enumerate() {
        canvas.centered(*line, 55.0 + 15.0 * i as f32, Font::Helvetica, 10.0, TEXT);
    }
    canvas.line((MARGIN, 120.0), (RIGHT_EDGE, 120.0), 1.0, ACCENT);
    canvas.centered(
        format!("Salary Slip for {}", sheet.month),
        135.0,
        Font::TimesBold,
        14.0,
        PRIMARY,
    );

    // Identity block
    let identity = &sheet.identity;
    let join_date = identity
        .join_date
        .map(|d| d.format("%d/%m/%Y").to_string());
    let details = [
        (
            format!("Employee ID: {}", or_placeholder(identity.employee_code.as_deref())),
            format!("PAN: {}", or_placeholder(identity.pan.as_deref())),
        ),
        (
            format!("Employee Name: {}", or_placeholder(Some(&identity.name))),
            format!("Aadhaar No.: {}", or_placeholder(identity.national_id.as_deref())),
        ),
        (
            format!("Date of Joining: {}", or_placeholder(join_date.as_deref())),
            format!("Designation: {}", or_placeholder(identity.designation.as_deref())),
        ),
    ];
    for (i, (left, right)) in details.into_iter().enumerate() {
        let y = 165.0 + 15.0 * i as f32;
        let half = DETAILS_RIGHT_X - MARGIN;
        canvas.text(left, MARGIN, y, half, Align::Left, Font::Helvetica, 10.0, TEXT);
        canvas.text(
            right,
            DETAILS_RIGHT_X,
            y,
            RIGHT_EDGE - DETAILS_RIGHT_X,
            Align::Left,
            Font::Helvetica,
            10.0,
            TEXT,
        );
    }

    // Table frame
    canvas.marks.push(Mark::Fill {
        x: MARGIN,
        y: TABLE_TOP + 15.0,
        width: RIGHT_EDGE - MARGIN,
        height: 140.0,
        color: TABLE_TINT,
    });
    for offset in ROW_LINES {
        let y = TABLE_TOP + offset;
        canvas.line((MARGIN, y), (RIGHT_EDGE, y), 0.5, BORDER);
    }
    for x in COLUMN_LINES {
        canvas.line((x, TABLE_TOP + 15.0), (x, TABLE_TOP + 155.0), 0.5, BORDER);
    }

    canvas.text(
        "Gross Earnings",
        MARGIN,
        TABLE_TOP,
        EARNING_AMOUNT_X + EARNING_AMOUNT_WIDTH - MARGIN,
        Align::Left,
        Font::HelveticaBold,
        11.0,
        PRIMARY,
    );
    canvas.text(
        "Deductions",
        DEDUCTION_COLUMN_X + 15.0,
        TABLE_TOP,
        RIGHT_EDGE - DEDUCTION_COLUMN_X - 15.0,
        Align::Left,
        Font::HelveticaBold,
        11.0,
        PRIMARY,
    );
    table_row(
        &mut canvas,
        TABLE_TOP + 20.0,
        ("Particulars", "Amount".to_string()),
        Some(("Particulars", "Amount".to_string())),
        Font::Helvetica,
        TEXT,
    );

    // Rows
    let earnings = &sheet.earnings;
    let deductions = &sheet.deductions;
    let earning_rows = [
        ("Basic Salary", sheet.totals.prorated_basic),
        ("House Rent Allowance", earnings.house_rent_allowance),
        ("Transport Allowance", earnings.transport_allowance),
        ("Medical Allowance", earnings.medical_allowance),
        ("Others", earnings.others),
        ("Bonus", earnings.bonus),
        ("Overtime", earnings.overtime),
    ];
    let deduction_rows = [
        ("Income Tax", deductions.income_tax),
        ("Provident Fund", deductions.provident_fund),
        ("ESI", deductions.esi),
        ("Professional Tax", deductions.professional_tax),
        ("Others", deductions.others),
        ("Advance", deductions.advance),
    ];
    for (i, (label, amount)) in earning_rows.into_iter().enumerate() {
        let deduction = deduction_rows
            .get(i)
            .map(|(label, amount)| (*label, format_amount(*amount)));
        table_row(
            &mut canvas,
            FIRST_ROW + ROW_HEIGHT * i as f32,
            (label, format_amount(amount)),
            deduction,
            Font::Helvetica,
            TEXT,
        );
    }

    // Totals
    table_row(
        &mut canvas,
        TABLE_TOP + 145.0,
        ("Total Earnings", format_amount(sheet.totals.total_earnings)),
        Some((
            "Total Deductions",
            format_amount(sheet.totals.total_deductions),
        )),
        Font::HelveticaBold,
        PRIMARY,
    );

    let summary_y = TABLE_TOP + 180.0;
    canvas.text(
        format!("Net Payable: {}", format_amount(sheet.totals.net_payable)),
        MARGIN,
        summary_y,
        DETAILS_RIGHT_X - MARGIN,
        Align::Left,
        Font::TimesBold,
        12.0,
        PRIMARY,
    );
    canvas.text(
        format!("Paid Days: {}", format_days(sheet.days_worked)),
        DETAILS_RIGHT_X,
        summary_y,
        RIGHT_EDGE - DETAILS_RIGHT_X,
        Align::Right,
        Font::TimesBold,
        12.0,
        PRIMARY,
    );

    // Signature
    canvas.text(
        "Authorized Signatory",
        MARGIN,
        TABLE_TOP + 210.0,
        150.0,
        Align::Left,
        Font::Helvetica,
        10.0,
        TEXT,
    );
    canvas.line(
        (MARGIN, TABLE_TOP + 225.0),
        (MARGIN + 150.0, TABLE_TOP + 225.0),
        0.5,
        BORDER,
    );

    // Footer
    for (i, line) in FOOTER.iter().enumerate() {
        canvas.centered(
            *line,
            TABLE_TOP + 260.0 + 15.0 * i as f32,
            Font::HelveticaOblique,
            8.0,
            TEXT,
        );
    }

    canvas.marks
}

fn table_row(
    canvas: &mut Canvas,
    y: f32,
    earning: (&str, String),
    deduction: Option<(&str, String)>,
    font: Font,
    color: Color,
) {
    let label_width = EARNING_AMOUNT_X - EARNING_LABEL_X;
    canvas.text(earning.0, EARNING_LABEL_X, y, label_width, Align::Left, font, 10.0, color);
    canvas.text(
        earning.1,
        EARNING_AMOUNT_X,
        y,
        EARNING_AMOUNT_WIDTH,
        Align::Right,
        font,
        10.0,
        color,
    );
    if let Some((label, amount)) = deduction {
        let label_width = DEDUCTION_AMOUNT_X - DEDUCTION_LABEL_X;
        canvas.text(label, DEDUCTION_LABEL_X, y, label_width, Align::Left, font, 10.0, color);
        canvas.text(
            amount,
            DEDUCTION_AMOUNT_X,
            y,
            DEDUCTION_AMOUNT_WIDTH,
            Align::Right,
            font,
            10.0,
            color,
        );
    }
}

/// WinAnsi bytes for `content`. Latin-1 maps one to one; anything else prints as `?`.
fn pdf_text(content: &str) -> Vec<u8> {
    content
        .chars()
        .map(|c| match c as u32 {
            code @ (32..=126 | 160..=255) => code as u8,
            _ => b'?',
        })
        .collect()
}

fn num(value: f32) -> Object {
    ((value * 100.0).round() / 100.0).into()
}

fn rgb(operator: &str, color: Color) -> Operation {
    Operation::new(operator, vec![num(color.0), num(color.1), num(color.2)])
}

fn flip(y: f32) -> f32 {
    PAGE_HEIGHT - y
}

fn operations(marks: &[Mark]) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(marks.len() * 5);
    for mark in marks {
        match mark {
            Mark::Fill {
                x,
                y,
                width,
                height,
                color,
            } => {
                ops.push(rgb("rg", *color));
                ops.push(Operation::new(
                    "re",
                    vec![num(*x), num(flip(*y + *height)), num(*width), num(*height)],
                ));
                ops.push(Operation::new("f", vec![]));
            }
            Mark::Line {
                from,
                to,
                width,
                color,
            } => {
                ops.push(Operation::new("w", vec![num(*width)]));
                ops.push(rgb("RG", *color));
                ops.push(Operation::new("m", vec![num(from.0), num(flip(from.1))]));
                ops.push(Operation::new("l", vec![num(to.0), num(flip(to.1))]));
                ops.push(Operation::new("S", vec![]));
            }
            Mark::Text {
                x,
                y,
                width,
                align,
                font,
                size,
                color,
                content,
            } => {
                let advance = text_width(*font, *size, content);
                let content = pdf_text(content);
                let start = match align {
                    Align::Left => *x,
                    Align::Center => *x + (*width - advance) / 2.0,
                    Align::Right => *x + *width - advance,
                };
                let baseline = flip(*y + font.ascent() * *size / 1000.0);

                ops.push(rgb("rg", *color));
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new("Tf", vec![font.resource().into(), num(*size)]));
                ops.push(Operation::new("Td", vec![num(start), num(baseline)]));
                ops.push(Operation::new("Tj", vec![Object::string_literal(content)]));
                ops.push(Operation::new("ET", vec![]));
            }
        }
    }
    ops
}

/// Encodes marks into an uncompressed single-page PDF. Output is byte-stable for equal input.
pub fn encode_pdf(marks: &[Mark]) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let content = Content {
        operations: operations(marks),
    };
    let encoded = content
        .encode()
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), (PAGE_WIDTH as i64).into(), (PAGE_HEIGHT as i64).into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Lays out and encodes one slip. The caller decides where the bytes go.
pub fn render(sheet: &SlipSheet) -> Result<RenderedSlip, RenderError> {
    let bytes = encode_pdf(&layout(sheet))?;
    Ok(RenderedSlip {
        file_name: slip_file_name(&sheet.identity.name, &sheet.month),
        bytes,
    })
}
