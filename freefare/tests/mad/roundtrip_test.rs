#[path = "../common/mod.rs"]
mod common;

use std::cell::RefCell;
use std::rc::Rc;

use freefare::prelude::*;
use freefare::test_support::ClassicCardSim;

const KEY_B: ClassicKey = [0xB0, 0xB1, 0xB2, 0xB3, 0xB4, 0xB5];

fn classic_on_sim() -> (Rc<RefCell<ClassicCardSim>>, Device<Initialized>, Tag) {
    common::init_logger();
    let sim = Rc::new(RefCell::new(ClassicCardSim::default()));
    let mut device = DeviceBuilder::new()
        .with_transport(Box::new(sim.clone()))
        .build()
        .unwrap();
    let mut tag = device.tags().unwrap().remove(0);
    tag.connect(&mut device).unwrap();
    (sim, device, tag)
}

#[test]
fn mad_v2_write_then_read() -> anyhow::Result<()> {
    let (sim, mut device, mut tag) = classic_on_sim();
    let classic = tag.as_classic_mut()?;

    let mut mad = Mad::new(MadVersion::V2);
    let transit = MadAid::new(0x12, 0x34);
    let access = MadAid::new(0x48, 0x01);
    mad.set_card_publisher_sector(0x01)?;
    assert_eq!(mad.application_alloc(transit, 96)?, vec![1, 2]);
    mad.set_aid(0x20, access)?;
    mad.write(classic, &mut device, &KEY_B, &KEY_B)?;

    {
        let card = sim.borrow();
        assert_eq!(card.blocks[3][6..10], [0x78, 0x77, 0x88, 0xC2]);
        assert_eq!(card.blocks[3][..6], [0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5]);
        assert_eq!(card.blocks[67][6..9], [0x78, 0x77, 0x88]);
        // AIDs are stored application code first
        assert_eq!(card.blocks[1][2..4], [0x34, 0x12]);
    }

    let read = Mad::read(classic, &mut device)?;
    assert_eq!(read, mad);
    assert_eq!(read.application_find(transit), vec![1, 2]);
    assert_eq!(read.application_find(access), vec![0x20]);
    assert_eq!(read.card_publisher_sector(), 0x01);
    Ok(())
}

#[test]
fn mad_v1_ignores_sector_0x10() -> anyhow::Result<()> {
    let (sim, mut device, mut tag) = classic_on_sim();
    let classic = tag.as_classic_mut()?;

    Mad::new(MadVersion::V1).write(classic, &mut device, &KEY_B, &KEY_B)?;
    assert_eq!(sim.borrow().blocks[67], [0u8; 16]);
    assert_eq!(Mad::read(classic, &mut device)?.version(), MadVersion::V1);
    Ok(())
}

#[test]
fn tampered_directory_is_corrupt() -> anyhow::Result<()> {
    let (sim, mut device, mut tag) = classic_on_sim();
    let classic = tag.as_classic_mut()?;

    let mut mad = Mad::new(MadVersion::V1);
    mad.set_aid(4, MadAid::new(0x01, 0x02))?;
    mad.write(classic, &mut device, &KEY_B, &KEY_B)?;
    sim.borrow_mut().blocks[2][0] ^= 0x40;

    assert!(matches!(
        Mad::read(classic, &mut device),
        Err(Error::CorruptData(_))
    ));
    Ok(())
}

#[test]
fn blank_card_has_no_directory() {
    let (_sim, mut device, mut tag) = classic_on_sim();
    let classic = tag.as_classic_mut().unwrap();
    assert!(matches!(
        Mad::read(classic, &mut device),
        Err(Error::CorruptData(_))
    ));
}
